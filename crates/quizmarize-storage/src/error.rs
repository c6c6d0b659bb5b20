//! Error types for blob storage.

use thiserror::Error;

/// Errors that can occur when talking to the object store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The requested object does not exist.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The store could not be reached or rejected the request.
    #[error("Storage transport error: {0}")]
    Transport(String),

    /// The store is misconfigured.
    #[error("Storage configuration error: {0}")]
    Config(String),

    /// The object key cannot be mapped onto this backend.
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Local filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
