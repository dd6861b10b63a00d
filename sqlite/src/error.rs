//! Error types for the SQLite driver.
//!
//! Engine failures are passed through as [`rusqlite::Error`]; a failure
//! while applying generated SQL also records the statement that failed.

use thiserror::Error;

/// Errors that can occur while reading or changing a live database.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// A generated statement was rejected; the transaction was rolled back.
    ///
    /// `source` is the engine's error, unchanged. Use
    /// [`SqliteError::engine_error`] to match on it regardless of variant.
    #[error("statement failed: {statement}: {source}")]
    StatementFailed {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl SqliteError {
    /// The underlying engine error, whichever variant carries it.
    pub fn engine_error(&self) -> &rusqlite::Error {
        match self {
            Self::DatabaseError(err) => err,
            Self::StatementFailed { source, .. } => source,
        }
    }
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
