//! Error types shared by the training and prediction paths.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Unseen category '{value}' in column '{column}'")]
    UnseenCategory { column: String, value: String },

    #[error("Invalid value '{value}' for column '{column}'")]
    InvalidValue { column: String, value: String },

    #[error("Corrupt artifact: {0}")]
    CorruptArtifact(String),
}

/// Result type for training and prediction.
pub type Result<T> = std::result::Result<T, Error>;
