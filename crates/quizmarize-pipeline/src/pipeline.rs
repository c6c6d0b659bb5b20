//! Document pipeline.

use crate::error::{PipelineError, PipelineResult};
use bytes::Bytes;
use quizmarize_core::{File, FileDetail, FileStatus, Summary, User};
use quizmarize_db::{Database, DbError, DbResult};
use quizmarize_llm::CompletionClient;
use quizmarize_storage::{object_key, BlobStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Characters of extracted text echoed back after an upload.
pub const PREVIEW_CHARS: usize = 200;

/// One uploaded document as received from the client.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Result of ingesting an upload.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The file record, `completed`.
    pub file: File,
    /// Public URL of the stored blob.
    pub url: String,
    pub content_preview: String,
}

/// Orchestrates storage, extraction and summarization for uploaded files.
#[derive(Clone)]
pub struct DocumentPipeline {
    db: Database,
    store: Arc<dyn BlobStore>,
    completion: CompletionClient,
}

impl DocumentPipeline {
    pub fn new(db: Database, store: Arc<dyn BlobStore>, completion: CompletionClient) -> Self {
        Self { db, store, completion }
    }

    /// Run a database call on the blocking pool.
    pub async fn run_db<T, F>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        match tokio::task::spawn_blocking(move || f(&db)).await {
            Ok(result) => result,
            Err(e) => Err(DbError::Other(format!("Database task failed: {}", e))),
        }
    }

    /// Store an upload, record it and extract its text.
    ///
    /// Once the record exists, any later failure leaves it `failed`. A blob
    /// that cannot be read back is reported as [`PipelineError::RetrievalFailed`]
    /// and stays in the store.
    pub async fn ingest(&self, owner: &User, upload: UploadRequest) -> PipelineResult<IngestOutcome> {
        let content_type = upload
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .ok_or(PipelineError::MissingContentType)?
            .to_string();

        let key = object_key(&owner.id, &upload.filename);
        info!(
            "Ingesting {} ({}, {} bytes) for user {}",
            upload.filename,
            content_type,
            upload.bytes.len(),
            owner.id
        );

        let url = self.store.upload(upload.bytes, &key, &content_type).await?;

        let file = File::new(&owner.id, &upload.filename, &key, &content_type);
        let file_id = file.id.clone();
        self.run_db(move |db| db.create_file(&file)).await?;

        let id = file_id.clone();
        if let Err(e) = self.run_db(move |db| db.mark_file_processing(&id)).await {
            self.mark_failed(&file_id).await;
            return Err(e.into());
        }

        let bytes = match self.store.download(&key).await {
            Ok(bytes) => bytes,
            Err(source) => {
                warn!("Could not read back {} for file {}: {}", key, file_id, source);
                self.mark_failed(&file_id).await;
                return Err(PipelineError::RetrievalFailed { file_id, source });
            }
        };

        let text = extract_text(bytes, content_type).await;
        let chars = text.chars().count();

        let id = file_id.clone();
        let completed = self
            .run_db(move |db| {
                db.mark_file_completed(&id, &text)?;
                db.get_file(&id)
            })
            .await;
        let file = match completed {
            Ok(file) => file,
            Err(e) => {
                self.mark_failed(&file_id).await;
                return Err(e.into());
            }
        };

        let content_preview = file.content_preview(PREVIEW_CHARS);
        info!("File {} completed with {} characters of text", file.id, chars);

        Ok(IngestOutcome {
            file,
            url,
            content_preview,
        })
    }

    /// Move a record out of `processing` after a failure.
    async fn mark_failed(&self, file_id: &str) {
        let id = file_id.to_string();
        if let Err(e) = self.run_db(move |db| db.mark_file_failed(&id)).await {
            warn!("Could not mark file {} failed: {}", file_id, e);
        }
    }

    /// Files owned by `owner`, newest first.
    pub async fn list_files(&self, owner: &User) -> PipelineResult<Vec<File>> {
        let owner_id = owner.id.clone();
        Ok(self.run_db(move |db| db.list_files_for_owner(&owner_id)).await?)
    }

    /// A file with its summary and tasks, if `owner` owns it.
    pub async fn file_detail(&self, owner: &User, file_id: &str) -> PipelineResult<FileDetail> {
        let id = file_id.to_string();
        let detail = self
            .run_db(move |db| db.get_file_detail(&id))
            .await
            .map_err(not_found_as(file_id))?;
        if !detail.file.is_owned_by(&owner.id) {
            return Err(PipelineError::Forbidden);
        }
        Ok(detail)
    }

    /// Summarize a completed file and generate its quiz tasks.
    pub async fn summarize(&self, owner: &User, file_id: &str) -> PipelineResult<FileDetail> {
        let detail = self.file_detail(owner, file_id).await?;
        if detail.file.status != FileStatus::Completed {
            return Err(PipelineError::NotReady {
                status: detail.file.status,
            });
        }
        if detail.summary.is_some() {
            return Err(PipelineError::AlreadySummarized);
        }

        let text = detail.file.content.unwrap_or_default();
        debug!("Summarizing file {} via {}", file_id, self.completion.backend_name());

        let summary_text = self.completion.summarize(&text).await;
        let tasks = self.completion.generate_tasks(&text).await;
        let summary = Summary::new(file_id, summary_text).with_tasks(tasks);

        let id = file_id.to_string();
        let stored = self
            .run_db(move |db| {
                db.create_summary(&summary)?;
                db.get_file_detail(&id)
            })
            .await;

        stored.map_err(|e| match e {
            // Lost a race with another summarize call
            DbError::Conflict(_) => PipelineError::AlreadySummarized,
            other => PipelineError::from(other),
        })
    }
}

fn not_found_as(file_id: &str) -> impl FnOnce(DbError) -> PipelineError + '_ {
    move |e| match e {
        DbError::NotFound(_) => PipelineError::NotFound(file_id.to_string()),
        other => PipelineError::from(other),
    }
}

/// Run the parser off the async workers.
async fn extract_text(bytes: Bytes, content_type: String) -> String {
    match tokio::task::spawn_blocking(move || quizmarize_extract::extract(&bytes, &content_type)).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Extraction task failed: {}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quizmarize_extract::fixtures::{docx_with_paragraphs, pdf_with_pages};
    use quizmarize_extract::DOCX_MIME;
    use quizmarize_llm::testing::ScriptedBackend;
    use quizmarize_llm::SUMMARY_FAILED;
    use quizmarize_storage::{MemoryBlobStore, StorageError, StorageResult};

    const TASKS: &str = r#"{"tasks": [
        {"task_type": "open_question", "task_data": {"question": "What was greeted?"}},
        {"task_type": "multiple_choice", "task_data": {"question": "Greeting?", "options": ["HELLO", "BYE"], "correct_answer": "HELLO"}}
    ]}"#;

    /// Accepts uploads but loses every object before it can be read back.
    struct ForgetfulStore(MemoryBlobStore);

    #[async_trait]
    impl BlobStore for ForgetfulStore {
        async fn ensure_bucket_exists(&self) -> StorageResult<()> {
            Ok(())
        }

        async fn upload(&self, bytes: Bytes, key: &str, content_type: &str) -> StorageResult<String> {
            self.0.upload(bytes, key, content_type).await
        }

        async fn download(&self, _key: &str) -> StorageResult<Bytes> {
            Err(StorageError::Transport("connection reset".to_string()))
        }

        fn public_url(&self, key: &str) -> String {
            self.0.public_url(key)
        }
    }

    /// Rejects every upload.
    struct BrokenStore;

    #[async_trait]
    impl BlobStore for BrokenStore {
        async fn ensure_bucket_exists(&self) -> StorageResult<()> {
            Ok(())
        }

        async fn upload(&self, _bytes: Bytes, _key: &str, _content_type: &str) -> StorageResult<String> {
            Err(StorageError::Transport("bucket unreachable".to_string()))
        }

        async fn download(&self, key: &str) -> StorageResult<Bytes> {
            Err(StorageError::NotFound(key.to_string()))
        }

        fn public_url(&self, key: &str) -> String {
            key.to_string()
        }
    }

    struct Harness {
        pipeline: DocumentPipeline,
        db: Database,
        store: Arc<MemoryBlobStore>,
        backend: Arc<ScriptedBackend>,
        user: User,
    }

    fn harness() -> Harness {
        harness_with_backend(ScriptedBackend::new("A greeting.", TASKS))
    }

    fn harness_with_backend(backend: ScriptedBackend) -> Harness {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user("student@example.com").unwrap();
        let store = Arc::new(MemoryBlobStore::default());
        let backend = Arc::new(backend);
        let pipeline = DocumentPipeline::new(db.clone(), store.clone(), CompletionClient::new(backend.clone()));
        Harness {
            pipeline,
            db,
            store,
            backend,
            user,
        }
    }

    fn pdf_upload(text: &str) -> UploadRequest {
        UploadRequest {
            filename: "hello.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: Bytes::from(pdf_with_pages(&[text]).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_ingest_pdf() {
        let h = harness();
        let outcome = h.pipeline.ingest(&h.user, pdf_upload("HELLO WORLD")).await.unwrap();

        assert_eq!(outcome.file.status, FileStatus::Completed);
        assert!(outcome.content_preview.contains("HELLO WORLD"));
        assert!(outcome.file.object_key.starts_with(&format!("user_{}/", h.user.id)));
        assert!(outcome.file.object_key.ends_with(".pdf"));
        assert_eq!(
            outcome.url,
            format!("http://localhost:9000/quizmarize/{}", outcome.file.object_key)
        );
        assert!(h.store.contains(&outcome.file.object_key).await);

        let stored = h.db.get_file(&outcome.file.id).unwrap();
        assert!(stored.content.unwrap().contains("HELLO WORLD"));
    }

    #[tokio::test]
    async fn test_ingest_docx() {
        let h = harness();
        let upload = UploadRequest {
            filename: "notes.docx".to_string(),
            content_type: Some(DOCX_MIME.to_string()),
            bytes: Bytes::from(docx_with_paragraphs(&["Cells", "Membranes"]).unwrap()),
        };

        let outcome = h.pipeline.ingest(&h.user, upload).await.unwrap();
        assert_eq!(outcome.file.status, FileStatus::Completed);
        assert_eq!(outcome.content_preview, "Cells\nMembranes");
    }

    #[tokio::test]
    async fn test_unsupported_type_completes_with_empty_text() {
        let h = harness();
        let upload = UploadRequest {
            filename: "notes.txt".to_string(),
            content_type: Some("text/plain".to_string()),
            bytes: Bytes::from_static(b"plain words"),
        };

        let outcome = h.pipeline.ingest(&h.user, upload).await.unwrap();
        assert_eq!(outcome.file.status, FileStatus::Completed);
        assert_eq!(outcome.file.content.as_deref(), Some(""));
        assert_eq!(outcome.content_preview, "");
    }

    #[tokio::test]
    async fn test_preview_is_bounded() {
        let h = harness();
        let long = "A".repeat(PREVIEW_CHARS * 2);
        let outcome = h.pipeline.ingest(&h.user, pdf_upload(&long)).await.unwrap();
        assert_eq!(outcome.content_preview.chars().count(), PREVIEW_CHARS);
    }

    #[tokio::test]
    async fn test_missing_content_type_writes_nothing() {
        let h = harness();
        for content_type in [None, Some("  ".to_string())] {
            let upload = UploadRequest {
                content_type,
                ..pdf_upload("HELLO")
            };
            let err = h.pipeline.ingest(&h.user, upload).await.unwrap_err();
            assert!(matches!(err, PipelineError::MissingContentType));
        }

        assert!(h.store.is_empty().await);
        assert!(h.pipeline.list_files(&h.user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_upload_creates_no_record() {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user("a@example.com").unwrap();
        let backend = Arc::new(ScriptedBackend::new("s", TASKS));
        let pipeline = DocumentPipeline::new(db, Arc::new(BrokenStore), CompletionClient::new(backend));

        let err = pipeline.ingest(&user, pdf_upload("HELLO")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Storage(_)));
        assert!(pipeline.list_files(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_download_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user("a@example.com").unwrap();
        let store = Arc::new(ForgetfulStore(MemoryBlobStore::default()));
        let backend = Arc::new(ScriptedBackend::new("s", TASKS));
        let pipeline = DocumentPipeline::new(db.clone(), store.clone(), CompletionClient::new(backend));

        let err = pipeline.ingest(&user, pdf_upload("HELLO")).await.unwrap_err();
        let (file_id, source) = match err {
            PipelineError::RetrievalFailed { file_id, source } => (file_id, source),
            other => panic!("expected RetrievalFailed, got {other:?}"),
        };
        assert!(matches!(source, StorageError::Transport(_)));

        let file = db.get_file(&file_id).unwrap();
        assert_eq!(file.status, FileStatus::Failed);
        assert!(file.content.is_none());

        // The orphaned blob is kept
        assert!(store.0.contains(&file.object_key).await);
    }

    #[tokio::test]
    async fn test_database_failure_does_not_leave_file_processing() {
        let h = harness();
        h.db.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_completion BEFORE UPDATE OF status ON files
                 WHEN NEW.status = 'completed'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let err = h.pipeline.ingest(&h.user, pdf_upload("HELLO")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Database(_)));

        let files = h.pipeline.list_files(&h.user).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].status, FileStatus::Failed);
    }

    #[tokio::test]
    async fn test_summarize_stores_summary_and_tasks() {
        let h = harness();
        let outcome = h.pipeline.ingest(&h.user, pdf_upload("HELLO WORLD")).await.unwrap();

        let detail = h.pipeline.summarize(&h.user, &outcome.file.id).await.unwrap();
        let summary = detail.summary.expect("summary stored");
        assert_eq!(summary.summary_text, "A greeting.");
        assert_eq!(summary.tasks.len(), 2);

        // Both prompts carried the extracted text
        let requests = h.backend.requests().await;
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.prompt.contains("HELLO WORLD")));

        let again = h.pipeline.summarize(&h.user, &outcome.file.id).await.unwrap_err();
        assert!(matches!(again, PipelineError::AlreadySummarized));
    }

    #[tokio::test]
    async fn test_summarize_keeps_soft_failures() {
        let h = harness_with_backend(ScriptedBackend::failing());
        let outcome = h.pipeline.ingest(&h.user, pdf_upload("HELLO")).await.unwrap();

        let detail = h.pipeline.summarize(&h.user, &outcome.file.id).await.unwrap();
        let summary = detail.summary.unwrap();
        assert_eq!(summary.summary_text, SUMMARY_FAILED);
        assert!(summary.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_summarize_requires_completed_file() {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user("a@example.com").unwrap();
        let store = Arc::new(ForgetfulStore(MemoryBlobStore::default()));
        let backend = Arc::new(ScriptedBackend::new("s", TASKS));
        let pipeline = DocumentPipeline::new(db, store, CompletionClient::new(backend.clone()));

        pipeline.ingest(&user, pdf_upload("HELLO")).await.unwrap_err();
        let files = pipeline.list_files(&user).await.unwrap();
        let err = pipeline.summarize(&user, &files[0].id).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::NotReady {
                status: FileStatus::Failed
            }
        ));
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_ownership_and_missing_files() {
        let h = harness();
        let outcome = h.pipeline.ingest(&h.user, pdf_upload("HELLO")).await.unwrap();
        let intruder = h.db.get_or_create_user("intruder@example.com").unwrap();

        assert!(matches!(
            h.pipeline.file_detail(&intruder, &outcome.file.id).await,
            Err(PipelineError::Forbidden)
        ));
        assert!(matches!(
            h.pipeline.summarize(&intruder, &outcome.file.id).await,
            Err(PipelineError::Forbidden)
        ));
        assert!(matches!(
            h.pipeline.file_detail(&h.user, "no-such-file").await,
            Err(PipelineError::NotFound(_))
        ));
        assert!(h.pipeline.list_files(&intruder).await.unwrap().is_empty());
    }
}
