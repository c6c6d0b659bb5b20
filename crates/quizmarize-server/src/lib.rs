//! Quizmarize Server
//!
//! HTTP API for uploading documents and reading back their extracted text,
//! summaries and quiz tasks.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod session;

use handlers::{create_router, AppState};
use quizmarize_config::{AppPaths, Config};
use quizmarize_db::Database;
use quizmarize_llm::CompletionClient;
use quizmarize_pipeline::DocumentPipeline;
use session::SessionManager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] quizmarize_config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] quizmarize_db::DbError),

    #[error("Storage error: {0}")]
    Storage(#[from] quizmarize_storage::StorageError),

    #[error("LLM backend error: {0}")]
    Llm(#[from] quizmarize_llm::LlmError),

    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Build the shared state: database, blob store and completion backend.
///
/// Makes sure the bucket exists before returning.
pub async fn build_state(config: &Config, paths: &AppPaths) -> Result<AppState, ServerError> {
    config.validate()?;

    let db = Database::open(config.database_path(paths))?;

    let store = quizmarize_storage::from_config(&config.storage, paths.blob_dir.clone())?;
    store.ensure_bucket_exists().await?;

    let backend = quizmarize_llm::backend_from_config(&config.llm)?;
    let completion = CompletionClient::new(backend);

    Ok(AppState {
        pipeline: DocumentPipeline::new(db, store, completion),
        sessions: Arc::new(SessionManager::new(
            &config.auth.jwt_secret,
            config.auth.token_expiry_secs,
        )),
        max_upload_bytes: config.server.max_upload_bytes,
    })
}

/// Start the HTTP server and run until it stops.
pub async fn start_server(config: Config, paths: AppPaths) -> Result<(), ServerError> {
    info!("Starting Quizmarize API");
    info!("Storage backend: {:?}, bucket '{}'", config.storage.backend, config.storage.bucket);
    info!("LLM provider: {:?}, model {}", config.llm.provider, config.llm.model);

    let state = build_state(&config, &paths).await?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.server.bind_addr()).await?;
    info!("Listening on {}", config.server.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
