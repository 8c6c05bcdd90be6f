//! Error types for SQLite store operations.

use thiserror::Error;

/// Errors that can occur during `SqliteStore` operations.
#[derive(Error, Debug)]
pub enum SqliteStoreError {
    /// SQLite returned an error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored column holds a value outside its domain.
    #[error("Invalid value in column '{column}': {value}")]
    InvalidColumn {
        /// Column name.
        column: &'static str,
        /// Offending value, rendered as text.
        value: String,
    },

    /// Failed to encode or decode the tag list.
    #[error("Failed to encode tags: {0}")]
    Tags(#[from] serde_json::Error),

    /// Failed to format or parse a timestamp.
    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    /// Failed to acquire the connection lock.
    #[error("Connection lock error")]
    LockError,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SqliteStoreError {
    pub(crate) fn invalid(column: &'static str, value: impl ToString) -> Self {
        Self::InvalidColumn {
            column,
            value: value.to_string(),
        }
    }
}

impl From<time::error::Format> for SqliteStoreError {
    fn from(err: time::error::Format) -> Self {
        Self::Timestamp(err.to_string())
    }
}

impl From<time::error::Parse> for SqliteStoreError {
    fn from(err: time::error::Parse) -> Self {
        Self::Timestamp(err.to_string())
    }
}
