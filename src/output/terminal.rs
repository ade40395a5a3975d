//! Plain table output for terminals

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::format::FormatTag;
use crate::model::Row;

use super::OutputFormatter;

const NULL_MARKER: &str = "NULL";

/// Terminal table output
pub struct TerminalOutput {
    null_marker: String,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            null_marker: NULL_MARKER.to_string(),
        }
    }

    fn write_header(
        &self,
        writer: &mut dyn Write,
        path: &Path,
        format: FormatTag,
        row_count: usize,
    ) -> Result<()> {
        writeln!(
            writer,
            "tabingest: {} ({}, {} rows)",
            path.display(),
            format,
            row_count
        )?;
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(
        &self,
        rows: &[Row],
        path: &Path,
        format: FormatTag,
        writer: &mut dyn Write,
    ) -> Result<()> {
        self.write_header(writer, path, format, rows.len())?;
        write!(writer, "{}", build_table(rows, &self.null_marker))?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Build a column-aligned table. Short rows are padded with blanks.
fn build_table(rows: &[Row], null_marker: &str) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut builder = Builder::default();

    let mut header = vec!["#".to_string()];
    header.extend((1..=width).map(|i| format!("column_{}", i)));
    builder.push_record(header);

    for (i, row) in rows.iter().enumerate() {
        let mut record = Vec::with_capacity(width + 1);
        record.push((i + 1).to_string());
        for col in 0..width {
            let cell = match row.get(col) {
                Some(Some(value)) => value.clone(),
                Some(None) => null_marker.to_string(),
                None => String::new(),
            };
            record.push(cell);
        }
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}
