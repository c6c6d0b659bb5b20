//! Error types for completion requests.

use thiserror::Error;

/// Errors that can occur when talking to a completion API.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Unable to reach the completion server.
    #[error("Connection error: cannot reach {host}")]
    Connection { host: String },

    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response had no usable content.
    #[error("Completion response contained no content")]
    EmptyResponse,

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for completion operations.
pub type LlmResult<T> = Result<T, LlmError>;
