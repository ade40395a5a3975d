//! Configuration handling for the tabingest binary

use std::path::PathBuf;

use crate::format::FormatTag;

/// Output format for imported rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Terminal,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "terminal" => Ok(OutputFormat::Terminal),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for a single import run
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File to read
    pub input: PathBuf,
    /// Format override; resolved from the file extension when unset
    pub format: Option<FormatTag>,
    /// Output format
    pub output_format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Print at most this many rows
    pub limit: Option<usize>,
}

impl Config {
    /// Create a new Config for an input file
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            pretty: true,
            ..Default::default()
        }
    }

    /// Force a format instead of sniffing the extension
    pub fn with_format(mut self, format: FormatTag) -> Self {
        self.format = Some(format);
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Limit the number of printed rows
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// File name used for extension sniffing
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
