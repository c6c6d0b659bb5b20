//! OpenAI-compatible chat completions backend.

use super::map_send_error;
use crate::error::{LlmError, LlmResult};
use crate::types::*;
use crate::CompletionBackend;
use async_trait::async_trait;
use quizmarize_config::LlmConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Backend for `POST {base_url}/chat/completions`.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl OpenAiBackend {
    /// Create a new backend from configuration.
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            &config.model,
            config.timeout_seconds,
        )
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout_seconds: u64,
    ) -> LlmResult<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(LlmError::InvalidConfig("base_url is empty".to_string()));
        }

        let timeout = Duration::from_secs(timeout_seconds);
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            timeout,
        })
    }

    fn chat_request(&self, request: CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(request.prompt));

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Requesting chat completion from {} with model {}", url, self.model);

        let mut builder = self.client.post(&url).json(&self.chat_request(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.base_url, self.timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::tests::{serve_json, unused_address};
    use serde_json::json;

    #[tokio::test]
    async fn test_chat_completion_request_shape() {
        let (base, seen) = serve_json(
            "/v1/chat/completions",
            json!({"choices": [{"message": {"role": "assistant", "content": "A summary."}}]}),
        )
        .await;

        let backend = OpenAiBackend::new(format!("{}/v1/", base), Some("sk-test".into()), "gpt-3.5-turbo", 5).unwrap();
        let request = CompletionRequest::new("Summarize this")
            .with_system("Be brief.")
            .with_temperature(0.5)
            .with_max_tokens(500)
            .with_json(true);

        assert_eq!(backend.complete(request).await.unwrap(), "A summary.");

        let seen = seen.lock().await;
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Summarize this");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[tokio::test]
    async fn test_plain_request_has_no_response_format() {
        let (base, seen) = serve_json(
            "/chat/completions",
            json!({"choices": [{"message": {"content": "ok"}}]}),
        )
        .await;

        let backend = OpenAiBackend::new(base, None, "m", 5).unwrap();
        backend.complete(CompletionRequest::new("hi")).await.unwrap();

        let seen = seen.lock().await;
        assert!(seen[0].0.is_none());
        assert!(seen[0].1.get("response_format").is_none());
        assert_eq!(seen[0].1["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_null_content_is_empty_response() {
        let (base, _) = serve_json(
            "/chat/completions",
            json!({"choices": [{"message": {"content": null}}]}),
        )
        .await;

        let backend = OpenAiBackend::new(base, None, "m", 5).unwrap();
        let err = backend.complete(CompletionRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let backend = OpenAiBackend::new(unused_address().await, None, "m", 5).unwrap();
        let err = backend.complete(CompletionRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::Connection { .. }));
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(matches!(
            OpenAiBackend::new(" ", None, "m", 5),
            Err(LlmError::InvalidConfig(_))
        ));
    }
}
