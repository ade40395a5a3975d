//! Output formatting for imported rows

mod json;
mod terminal;

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::config::OutputFormat;
use crate::format::FormatTag;
use crate::model::Row;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render rows to a writer
    fn render(
        &self,
        rows: &[Row],
        path: &Path,
        format: FormatTag,
        writer: &mut dyn Write,
    ) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat, pretty: bool) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Json if pretty => Box::new(JsonOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::compact()),
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
        }
    }
}

/// Render rows to stdout
pub fn render_to_stdout(
    rows: &[Row],
    path: &Path,
    format: FormatTag,
    output_format: OutputFormat,
    pretty: bool,
) -> Result<()> {
    let formatter = OutputFactory::create(output_format, pretty);
    let mut stdout = std::io::stdout().lock();
    formatter.render(rows, path, format, &mut stdout)
}
