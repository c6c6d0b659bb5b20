//! Core domain types for Quizmarize.

use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for users.
pub type UserId = String;

/// Unique identifier for uploaded files.
pub type FileId = String;

/// Unique identifier for summaries.
pub type SummaryId = String;

/// Unique identifier for generated tasks.
pub type TaskId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// An account that owns uploaded files.
///
/// Credentials live with the external identity provider; only the
/// identity itself is stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            email: email.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Processing status of an uploaded file.
///
/// Moves forward only: `uploaded -> processing -> completed | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Uploaded => "uploaded",
            FileStatus::Processing => "processing",
            FileStatus::Completed => "completed",
            FileStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "uploaded" => Some(FileStatus::Uploaded),
            "processing" => Some(FileStatus::Processing),
            "completed" => Some(FileStatus::Completed),
            "failed" => Some(FileStatus::Failed),
            _ => None,
        }
    }

    /// The status this one must be in before moving to `self`.
    pub fn predecessor(&self) -> Option<FileStatus> {
        match self {
            FileStatus::Uploaded => None,
            FileStatus::Processing => Some(FileStatus::Uploaded),
            FileStatus::Completed | FileStatus::Failed => Some(FileStatus::Processing),
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: FileId,
    pub owner_id: UserId,
    pub filename: String,
    pub object_key: String,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: FileStatus,
    pub content: Option<String>,
}

impl File {
    pub fn new(
        owner_id: impl Into<UserId>,
        filename: impl Into<String>,
        object_key: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            owner_id: owner_id.into(),
            filename: filename.into(),
            object_key: object_key.into(),
            content_type: content_type.into(),
            uploaded_at: Utc::now(),
            status: FileStatus::Uploaded,
            content: None,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// First `max_chars` characters of the extracted content.
    pub fn content_preview(&self, max_chars: usize) -> String {
        self.content
            .as_deref()
            .map(|c| c.chars().take(max_chars).collect())
            .unwrap_or_default()
    }
}

/// Generated summary of one file, with its tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub id: SummaryId,
    pub file_id: FileId,
    pub summary_text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Summary {
    pub fn new(file_id: impl Into<FileId>, summary_text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            file_id: file_id.into(),
            summary_text: summary_text.into(),
            created_at: Utc::now(),
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }
}

/// A file together with its summary and tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDetail {
    #[serde(flatten)]
    pub file: File,
    pub summary: Option<Summary>,
}
