//! Error types for schema definition files.
//!
//! Covers reading and parsing a definition and resolving its index
//! columns. Structural problems of the resulting schema are not errors;
//! they are reported by validation.

use thiserror::Error;

/// Errors that can occur while loading a schema definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// An index names a table the definition does not declare.
    #[error("index '{index}' refers to unknown table '{table}'")]
    UnknownTable { index: String, table: String },

    /// An index names a column its table does not declare.
    #[error("index '{index}' refers to unknown column '{column}' of table '{table}'")]
    UnknownColumn {
        index: String,
        table: String,
        column: String,
    },
}

/// Convenience alias for results with [`DefinitionError`].
pub type Result<T> = std::result::Result<T, DefinitionError>;
