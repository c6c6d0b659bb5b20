//! Summaries and quiz tasks on top of a completion backend.

use crate::error::{LlmError, LlmResult};
use crate::prompts;
use crate::types::CompletionRequest;
use crate::CompletionBackend;
use quizmarize_core::{Task, TaskData};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest input, in characters, sent to the model.
pub const MAX_INPUT_CHARS: usize = 12_000;

/// Returned when the model produced an empty summary.
pub const SUMMARY_EMPTY: &str = "Could not generate a summary.";

/// Returned when the summary request failed.
pub const SUMMARY_FAILED: &str = "Error: Summary generation failed.";

/// Document-level operations. Failures never escape: they turn into
/// fixed strings or an empty task list.
#[derive(Clone)]
pub struct CompletionClient {
    backend: Arc<dyn CompletionBackend>,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Summarize a document's text.
    pub async fn summarize(&self, text: &str) -> String {
        let request = CompletionRequest::new(prompts::summary_prompt(truncate_chars(text, MAX_INPUT_CHARS)))
            .with_system(prompts::SUMMARY_SYSTEM)
            .with_temperature(0.5)
            .with_max_tokens(500);

        match self.backend.complete(request).await {
            Ok(summary) => {
                let summary = summary.trim();
                if summary.is_empty() {
                    warn!("Model returned an empty summary");
                    SUMMARY_EMPTY.to_string()
                } else {
                    info!("Generated summary of {} characters", summary.chars().count());
                    summary.to_string()
                }
            }
            Err(e) => {
                warn!("Summary generation failed via {}: {}", self.backend.name(), e);
                SUMMARY_FAILED.to_string()
            }
        }
    }

    /// Generate quiz tasks from a document's text.
    pub async fn generate_tasks(&self, text: &str) -> Vec<Task> {
        let request = CompletionRequest::new(prompts::tasks_prompt(truncate_chars(text, MAX_INPUT_CHARS)))
            .with_system(prompts::TASKS_SYSTEM)
            .with_temperature(0.7)
            .with_max_tokens(2000)
            .with_json(true);

        let result = match self.backend.complete(request).await {
            Ok(raw) => parse_tasks(&raw),
            Err(e) => Err(e),
        };

        match result {
            Ok(tasks) => {
                info!("Generated {} tasks", tasks.len());
                tasks
            }
            Err(e) => {
                warn!("Task generation failed via {}: {}", self.backend.name(), e);
                Vec::new()
            }
        }
    }
}

/// The first `max` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[derive(Deserialize)]
struct TaskEnvelope {
    tasks: Vec<serde_json::Value>,
}

/// Parse a `{"tasks": [...]}` body, dropping entries that are not valid tasks.
pub fn parse_tasks(raw: &str) -> LlmResult<Vec<Task>> {
    let envelope: TaskEnvelope =
        serde_json::from_str(strip_code_fence(raw)).map_err(|e| LlmError::ParseError(e.to_string()))?;

    let total = envelope.tasks.len();
    let mut tasks = Vec::with_capacity(total);
    for (index, entry) in envelope.tasks.into_iter().enumerate() {
        let data = match serde_json::from_value::<TaskData>(entry) {
            Ok(data) => data,
            Err(e) => {
                warn!("Dropping task {}: {}", index, e);
                continue;
            }
        };
        if let Err(e) = data.validate() {
            warn!("Dropping {} task {}: {}", data.task_type(), index, e);
            continue;
        }
        tasks.push(Task::new(data));
    }

    debug!("Kept {} of {} generated tasks", tasks.len(), total);
    Ok(tasks)
}

/// Some models wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
