//! JSON output format

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::format::FormatTag;
use crate::model::Row;

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonImportOutput<'a> {
    file: String,
    format: &'static str,
    row_count: usize,
    rows: &'a [Row],
}

impl OutputFormatter for JsonOutput {
    fn render(
        &self,
        rows: &[Row],
        path: &Path,
        format: FormatTag,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let output = JsonImportOutput {
            file: path.display().to_string(),
            format: format.extension(),
            row_count: rows.len(),
            rows,
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
