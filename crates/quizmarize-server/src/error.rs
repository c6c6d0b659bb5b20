//! API error responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use quizmarize_pipeline::PipelineError;
use serde::Serialize;
use tracing::{error, warn};

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input
    BadRequest(String),
    /// Missing, invalid or expired credentials
    Unauthorized(String),
    /// Authenticated but not allowed
    Forbidden(String),
    NotFound(String),
    /// The resource is not in a state that allows the request
    Conflict(String),
    /// A backing service failed after the request was partly applied
    BadGateway(String),
    /// Multipart body could not be read
    Multipart(MultipartError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Multipart(e) => (e.status(), e.body_text()),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::MissingContentType => ApiError::BadRequest("File has no content type".to_string()),
            PipelineError::NotFound(_) => ApiError::NotFound("File not found".to_string()),
            PipelineError::Forbidden => ApiError::Forbidden("Not authorized to access this file".to_string()),
            e @ (PipelineError::NotReady { .. } | PipelineError::AlreadySummarized) => {
                ApiError::Conflict(e.to_string())
            }
            PipelineError::RetrievalFailed { file_id, source } => {
                warn!("Stored file {} could not be read back: {}", file_id, source);
                ApiError::BadGateway(format!("Stored file {} could not be read back and was marked failed", file_id))
            }
            e @ (PipelineError::Storage(_) | PipelineError::Database(_)) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<quizmarize_db::DbError> for ApiError {
    fn from(e: quizmarize_db::DbError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Multipart(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizmarize_core::FileStatus;

    fn status_of(e: PipelineError) -> StatusCode {
        ApiError::from(e).into_response().status()
    }

    #[test]
    fn test_pipeline_error_statuses() {
        assert_eq!(status_of(PipelineError::MissingContentType), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(PipelineError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(PipelineError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(PipelineError::NotReady {
                status: FileStatus::Processing
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(PipelineError::AlreadySummarized), StatusCode::CONFLICT);
        assert_eq!(
            status_of(PipelineError::Storage(quizmarize_storage::StorageError::Transport(
                "down".into()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(PipelineError::RetrievalFailed {
                file_id: "f1".into(),
                source: quizmarize_storage::StorageError::NotFound("k".into()),
            }),
            StatusCode::BAD_GATEWAY
        );
    }
}
