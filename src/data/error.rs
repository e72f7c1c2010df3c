//! Error types for data operations
//!
//! Provides unified error handling for table construction and ingestion.
//! The pipeline, statistics and chart registry never produce these: only
//! genuinely malformed input does.

use thiserror::Error;

// Re-export CSV limits from constants module for consistency
pub use crate::constants::{MAX_CSV_ROWS, MAX_CSV_SIZE_MB};

/// Errors that can occur during data operations
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parse error: {0}")]
    Csv(String),

    /// JSON parsing error from serde_json
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File is too large for eager loading
    #[error("File too large: {size_mb}MB (max {max_mb}MB)")]
    TooLarge { size_mb: u64, max_mb: usize },

    /// Too many rows for eager loading
    #[error("Too many rows: {rows} (max {max_rows})")]
    TooManyRows { rows: usize, max_rows: usize },

    /// File is empty
    #[error("Empty file")]
    EmptyFile,

    /// No columns found in data
    #[error("No columns found")]
    NoColumns,

    /// The same column name appears twice
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// A row is not a mapping of column name to value
    #[error("Row {index} is not an object")]
    RowNotObject { index: usize },

    /// Declared columns disagree with the keys of the first row
    #[error("Columns {expected:?} do not match first row keys {found:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Generic error message
    #[error("{0}")]
    Other(String),
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;

impl From<String> for DataError {
    fn from(s: String) -> Self {
        DataError::Other(s)
    }
}

impl From<&str> for DataError {
    fn from(s: &str) -> Self {
        DataError::Other(s.to_string())
    }
}
