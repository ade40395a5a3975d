//! tabingest - Tabular import file reader
//!
//! Normalizes CSV, XLS and XLSX import files into a uniform list of string
//! rows. The header row is dropped, blank rows are skipped, and an empty
//! result is reported as an error rather than returned.

pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod output;
pub mod parser;

pub use error::{ErrorKind, ImportError, Result};
pub use format::FormatTag;
pub use model::{Cell, Row, RowSet};
pub use parser::{read_file_data, read_path, read_with_format};
