//! Scripted backend for tests.

use crate::error::{LlmError, LlmResult};
use crate::types::CompletionRequest;
use crate::CompletionBackend;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Replies with a fixed summary to plain requests and fixed JSON to
/// JSON-mode requests, recording every request it sees.
pub struct ScriptedBackend {
    summary: Option<String>,
    tasks_json: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new(summary: impl Into<String>, tasks_json: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            tasks_json: Some(tasks_json.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A backend whose every request fails.
    pub fn failing() -> Self {
        Self {
            summary: None,
            tasks_json: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        let reply = if request.json {
            self.tasks_json.clone()
        } else {
            self.summary.clone()
        };
        self.requests.lock().await.push(request);

        reply.ok_or_else(|| LlmError::Connection {
            host: "scripted".to_string(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
