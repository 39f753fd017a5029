//! Storage Layer
//!
//! Persists classification history in SQLite with repository pattern.

mod record;
mod repository;

pub use record::{ClassificationRecord, NewClassification};
pub use repository::{Repository, RetryPolicy};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found")]
    NotFound,
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            other => StorageError::DatabaseError(other.to_string()),
        }
    }
}
