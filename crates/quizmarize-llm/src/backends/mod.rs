//! Completion API backends.

pub mod ollama;
pub mod openai;

use crate::error::LlmError;

/// Map a transport failure onto the error a caller can act on.
pub(crate) fn map_send_error(e: reqwest::Error, host: &str, timeout_secs: u64) -> LlmError {
    if e.is_connect() {
        LlmError::Connection {
            host: host.to_string(),
        }
    } else if e.is_timeout() {
        LlmError::Timeout {
            seconds: timeout_secs,
        }
    } else {
        LlmError::Http(e)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::extract::State;
    use axum::http::{header, HeaderMap};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    pub type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    /// Serve `reply` on `path`, recording the authorization header and body
    /// of every request.
    pub async fn serve_json(path: &str, reply: Value) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route(
                path,
                post(
                    move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let auth = headers
                                .get(header::AUTHORIZATION)
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            seen.lock().await.push((auth, body));
                            Json(reply)
                        }
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        (format!("http://{}", addr), seen)
    }

    /// An address nothing listens on.
    pub async fn unused_address() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }
}
