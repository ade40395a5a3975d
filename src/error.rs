//! Error types for file import.

use thiserror::Error;

/// Result type for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that can occur while reading an import file
#[derive(Debug, Error)]
pub enum ImportError {
    /// File name extension is not one of the recognized formats
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Format was recognized and parsed, but no data rows remained
    #[error("No data found in file")]
    EmptyResult,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook open or decode error
    #[error("Excel error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Workbook package (zip container) error
    #[error("Workbook package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Workbook part XML error
    #[error("Workbook XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Broad failure classes a caller can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    EmptyResult,
    ReadFault,
}

impl ImportError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ImportError::EmptyResult => ErrorKind::EmptyResult,
            ImportError::Io(_)
            | ImportError::Csv(_)
            | ImportError::Spreadsheet(_)
            | ImportError::Zip(_)
            | ImportError::Xml(_) => ErrorKind::ReadFault,
        }
    }
}

impl From<calamine::XlsError> for ImportError {
    fn from(err: calamine::XlsError) -> Self {
        ImportError::Spreadsheet(err.into())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::Spreadsheet(err.into())
    }
}
