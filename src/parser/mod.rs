//! Parser layer: routes an import file to the reader for its format

mod biff;
mod compound;
mod csv;
mod excel;
mod sheet_xml;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{ImportError, Result};
use crate::format::{file_extension, FormatTag};
use crate::model::RowSet;

pub use self::csv::read_csv;
pub use self::excel::read_excel;

/// Read the data rows of an import file.
///
/// `file_name` is only used to pick the format from its extension; the
/// content is read from `reader`. Fails with `UnsupportedFormat` before
/// touching the stream when the extension is not recognized, and with
/// `EmptyResult` when no data rows remain after dropping the header and
/// blank rows.
pub fn read_file_data<R: Read>(file_name: &str, reader: R) -> Result<RowSet> {
    let format = resolve_format(file_name)?;

    debug!(file_name, %format, "Reading import file");

    read_with_format(format, reader)
}

fn resolve_format(file_name: &str) -> Result<FormatTag> {
    FormatTag::from_file_name(file_name).ok_or_else(|| {
        ImportError::UnsupportedFormat(file_extension(file_name).unwrap_or_default().to_string())
    })
}

/// Read the data rows of a stream whose format is already known
pub fn read_with_format<R: Read>(format: FormatTag, reader: R) -> Result<RowSet> {
    let rows = match format {
        FormatTag::DelimitedText => read_csv(reader)?,
        FormatTag::SpreadsheetLegacy | FormatTag::SpreadsheetModern => read_excel(reader, format)?,
    };

    if rows.is_empty() {
        return Err(ImportError::EmptyResult);
    }

    Ok(rows)
}

/// Open a file on disk and read its data rows
pub fn read_path(path: &Path) -> Result<RowSet> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    // Reject before opening so unknown types never touch the filesystem
    let format = resolve_format(file_name)?;

    let file = File::open(path)?;
    read_with_format(format, BufReader::new(file))
}
