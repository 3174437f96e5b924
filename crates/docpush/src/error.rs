//! Error types for docpush
//!
//! A missing input file and integers BSON cannot hold are checked explicitly.
//! Everything else is the decoder's or the driver's own error, wrapped so
//! `main` can print it.

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Input path is missing or is not a regular file
    #[error("File '{0}' does not exist.")]
    FileNotFound(String),

    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON, or a top level that is not an array of objects
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A value BSON cannot hold, such as an integer above `i64::MAX`
    #[error("Failed to convert record to BSON: {0}")]
    Bson(String),

    /// Connection, authentication or insert failure reported by the driver
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl IngestError {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }
}
