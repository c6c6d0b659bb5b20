//! Quizmarize LLM - completion backends and the document-level client.
//!
//! [`CompletionBackend`] speaks one provider's wire format;
//! [`CompletionClient`] builds the prompts and turns responses into
//! summaries and quiz tasks.

mod backends;
mod client;
mod error;
mod prompts;
mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backends::ollama::OllamaBackend;
pub use backends::openai::OpenAiBackend;
pub use client::{
    parse_tasks, truncate_chars, CompletionClient, MAX_INPUT_CHARS, SUMMARY_EMPTY, SUMMARY_FAILED,
};
pub use error::{LlmError, LlmResult};
pub use types::CompletionRequest;

use async_trait::async_trait;
use quizmarize_config::{LlmConfig, LlmProvider};
use std::sync::Arc;

/// A text completion API.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion and return the generated text.
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}

/// Build the backend selected by the configuration.
pub fn backend_from_config(config: &LlmConfig) -> LlmResult<Arc<dyn CompletionBackend>> {
    let backend: Arc<dyn CompletionBackend> = match config.provider {
        LlmProvider::OpenAi => Arc::new(OpenAiBackend::from_config(config)?),
        LlmProvider::Ollama => Arc::new(OllamaBackend::from_config(config)?),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_config() {
        let mut config = LlmConfig::default();
        assert_eq!(backend_from_config(&config).unwrap().name(), "openai");

        config.provider = LlmProvider::Ollama;
        config.base_url = "http://localhost:11434".to_string();
        assert_eq!(backend_from_config(&config).unwrap().name(), "ollama");
    }
}
