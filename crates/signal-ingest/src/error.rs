//! Validation Error Types

use thiserror::Error;

/// Errors raised while turning raw tabular input into a signal
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// No rows or no columns at all
    #[error("The file is empty.")]
    Empty,

    /// Not enough rows to trust the input
    #[error("The file contains too few data points (minimum {min} required, got {actual}).")]
    TooFewRows { min: usize, actual: usize },

    /// Too many cells failed numeric coercion
    #[error("Too many non-numeric values in the file ({failed} of {total} cells).")]
    TooManyNonNumeric { failed: usize, total: usize },

    /// Requested signal row does not exist
    #[error("Signal row {index} is out of range (table has {rows} rows).")]
    RowOutOfRange { index: usize, rows: usize },

    /// Selected row has no numeric cell, e.g. a header line
    #[error("Signal row {row} contains no numeric values.")]
    NoNumericSamples { row: usize },

    /// Text could not be read as a delimited table
    #[error("The file is not a valid CSV file: {0}")]
    Malformed(String),

    /// Input exceeds the configured size limit
    #[error("File size ({size} bytes) exceeds the {limit} byte limit.")]
    FileTooLarge { size: u64, limit: u64 },

    /// Underlying read failure
    #[error("Error reading file: {0}")]
    Io(String),
}

impl From<std::io::Error> for ValidationError {
    fn from(err: std::io::Error) -> Self {
        ValidationError::Io(err.to_string())
    }
}
