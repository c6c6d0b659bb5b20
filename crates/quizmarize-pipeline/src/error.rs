//! Error types for the document pipeline.

use quizmarize_core::FileStatus;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur while handling a document.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Upload has no content type")]
    MissingContentType,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Not authorized to access this file")]
    Forbidden,

    #[error("File is {status}, only completed files can be summarized")]
    NotReady { status: FileStatus },

    #[error("File already has a summary")]
    AlreadySummarized,

    /// The blob was stored but reading it back failed; the record is left `failed`.
    #[error("Could not read back stored file {file_id}: {source}")]
    RetrievalFailed {
        file_id: String,
        source: quizmarize_storage::StorageError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] quizmarize_storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] quizmarize_db::DbError),
}
