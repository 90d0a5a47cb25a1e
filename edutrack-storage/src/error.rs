//! Storage error types.

use std::io;
use thiserror::Error;

/// Store adapter errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error during storage operation
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Persisted value is not a JSON array
    #[error("Corrupt collection '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Storage backend error
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
