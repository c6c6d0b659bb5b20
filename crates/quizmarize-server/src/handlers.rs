//! HTTP request handlers.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::session::SessionManager;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use quizmarize_core::{File, FileDetail, FileStatus, Summary, Task};
use quizmarize_pipeline::{DocumentPipeline, UploadRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: DocumentPipeline,
    pub sessions: Arc<SessionManager>,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub file_url: String,
    pub status: FileStatus,
    pub content_preview: String,
}

/// File entry in listings
#[derive(Debug, Serialize, Deserialize)]
pub struct FileRead {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: FileStatus,
}

impl From<&File> for FileRead {
    fn from(file: &File) -> Self {
        Self {
            id: file.id.clone(),
            filename: file.filename.clone(),
            content_type: file.content_type.clone(),
            uploaded_at: file.uploaded_at,
            status: file.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryRead {
    pub id: String,
    pub summary_text: String,
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

impl From<Summary> for SummaryRead {
    fn from(summary: Summary) -> Self {
        Self {
            id: summary.id,
            summary_text: summary.summary_text,
            created_at: summary.created_at,
            tasks: summary.tasks,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileDetailRead {
    #[serde(flatten)]
    pub file: FileRead,
    pub content: Option<String>,
    pub summary: Option<SummaryRead>,
}

impl From<FileDetail> for FileDetailRead {
    fn from(detail: FileDetail) -> Self {
        Self {
            file: FileRead::from(&detail.file),
            content: detail.file.content,
            summary: detail.summary.map(SummaryRead::from),
        }
    }
}

/// GET / - Health check
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        message: "Welcome to the Quizmarize API!".to_string(),
    })
}

/// POST /content/upload/ - Store and process one document
async fn upload_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        upload = Some(UploadRequest {
            filename,
            content_type,
            bytes,
        });
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
    let outcome = state.pipeline.ingest(&user, upload).await?;
    info!(
        "User {} uploaded {} as file {} ({})",
        user.id, outcome.file.filename, outcome.file.id, outcome.file.status
    );

    Ok(Json(UploadResponse {
        id: outcome.file.id,
        filename: outcome.file.filename,
        content_type: outcome.file.content_type,
        file_url: outcome.url,
        status: outcome.file.status,
        content_preview: outcome.content_preview,
    }))
}

/// GET /content/files/ - The caller's files, newest first
async fn list_files(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<FileRead>>, ApiError> {
    let files = state.pipeline.list_files(&user).await?;
    Ok(Json(files.iter().map(FileRead::from).collect()))
}

/// GET /content/files/:file_id - File detail with summary and tasks
async fn get_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<FileDetailRead>, ApiError> {
    let detail = state.pipeline.file_detail(&user, &file_id).await?;
    Ok(Json(detail.into()))
}

/// POST /content/files/:file_id/summarize - Generate summary and tasks
async fn summarize_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<FileDetailRead>, ApiError> {
    let detail = state.pipeline.summarize(&user, &file_id).await?;
    Ok(Json(detail.into()))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/content/upload", post(upload_file))
        .route("/content/upload/", post(upload_file))
        .route("/content/files", get(list_files))
        .route("/content/files/", get(list_files))
        .route("/content/files/:file_id", get(get_file))
        .route("/content/files/:file_id/", get(get_file))
        .route("/content/files/:file_id/summarize", post(summarize_file))
        .route("/content/files/:file_id/summarize/", post(summarize_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
