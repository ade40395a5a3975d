//! Supported input formats, resolved from file name extensions

use std::path::Path;

/// Input format of an import file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    /// Comma-separated text (`.csv`)
    DelimitedText,
    /// BIFF workbook (`.xls`)
    SpreadsheetLegacy,
    /// Office Open XML workbook (`.xlsx`)
    SpreadsheetModern,
}

/// Lower-case extension to format. Anything not listed here is rejected.
const EXTENSIONS: &[(&str, FormatTag)] = &[
    ("csv", FormatTag::DelimitedText),
    ("xls", FormatTag::SpreadsheetLegacy),
    ("xlsx", FormatTag::SpreadsheetModern),
];

impl FormatTag {
    /// Look up a format by extension, ignoring case
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|&(_, tag)| tag)
    }

    /// Resolve the format of a file name from its extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        file_extension(name).and_then(Self::from_extension)
    }

    /// Canonical lower-case extension
    pub fn extension(self) -> &'static str {
        match self {
            FormatTag::DelimitedText => "csv",
            FormatTag::SpreadsheetLegacy => "xls",
            FormatTag::SpreadsheetModern => "xlsx",
        }
    }
}

/// Text after the last dot of the final path component.
///
/// Unlike `Path::extension`, a leading dot counts, so `.csv` has extension
/// `csv`. Returns `None` when there is no dot or nothing follows it.
pub fn file_extension(name: &str) -> Option<&str> {
    let file_name = Path::new(name).file_name()?.to_str()?;
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for FormatTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.'))
            .ok_or_else(|| format!("Unknown file format: {}", s))
    }
}
