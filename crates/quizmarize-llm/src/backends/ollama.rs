//! Ollama backend.

use super::map_send_error;
use crate::error::{LlmError, LlmResult};
use crate::types::*;
use crate::CompletionBackend;
use async_trait::async_trait;
use quizmarize_config::LlmConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Backend for a local Ollama server's `/api/generate`.
#[derive(Clone)]
pub struct OllamaBackend {
    client: Client,
    host: String,
    model: String,
    timeout: Duration,
}

impl OllamaBackend {
    /// Create a new backend from configuration.
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        Self::new(&config.base_url, &config.model, config.timeout_seconds)
    }

    pub fn new(host: impl Into<String>, model: impl Into<String>, timeout_seconds: u64) -> LlmResult<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(LlmError::InvalidConfig("host is empty".to_string()));
        }

        let timeout = Duration::from_secs(timeout_seconds);
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
        })
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        let url = format!("{}/api/generate", self.host);
        debug!("Generating with model {}", self.model);

        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: request.prompt,
            system: request.system,
            format: request.json.then(|| "json".to_string()),
            stream: false,
            options: GenerateOptions {
                temperature: Some(request.temperature),
                num_predict: Some(request.max_tokens.min(i32::MAX as u32) as i32),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.host, self.timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        Ok(generated.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
