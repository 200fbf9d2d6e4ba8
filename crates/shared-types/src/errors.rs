//! # Error Types
//!
//! Storage errors shared by the journal adapters and the runtime.

use thiserror::Error;

/// Errors raised by durable storage backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Record not found in storage.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Data corruption detected while reading a frame.
    #[error("Data corruption at byte offset {offset}: {reason}")]
    DataCorruption { offset: u64, reason: String },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}
