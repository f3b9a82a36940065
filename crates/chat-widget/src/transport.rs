//! Completion transport seam.
//!
//! The controller never talks HTTP directly; it goes through
//! [`CompletionTransport`] so tests can swap in an in-process implementation.
//! [`HttpCompletionClient`] is the production implementation against the
//! chat completion service.

use std::time::Duration;

use async_trait::async_trait;
use database::Message;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request timeout for a completion round trip. Generous: it covers the
/// model call on the far side.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One user turn bound for the completion service.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub device_id: String,
    /// The session's store document id.
    pub session_id: String,
    pub message: String,
}

/// The completed exchange as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    /// Store document id of the session the exchange belongs to.
    pub session: String,
    /// Current session description (freshly summarized on the first turn).
    pub description: String,
    /// The persisted user message followed by the model reply.
    pub message: Vec<Message>,
}

/// Transport-level failures.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Anything that can turn a user message into a completed exchange.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TransportError>;
}

/// HTTP client for the chat completion service.
pub struct HttpCompletionClient {
    client: Client,
    url: String,
}

impl HttpCompletionClient {
    /// Point the client at the service's `/chat` endpoint URL.
    pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[async_trait]
impl CompletionTransport for HttpCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserializes_service_shape() {
        let body = serde_json::json!({
            "session": "doc-1",
            "description": "Rust questions",
            "message": [
                {
                    "id": 1,
                    "message_id": "u-1",
                    "device_id": "dev-1",
                    "session_id": "sess-1",
                    "role": "user",
                    "message": "hello",
                    "created_at": "2026-08-30 12:00:00",
                    "timestamp": 100
                },
                {
                    "id": 2,
                    "message_id": "a-1",
                    "device_id": "dev-1",
                    "session_id": "sess-1",
                    "role": "model",
                    "message": "hi",
                    "created_at": "2026-08-30 12:00:00",
                    "timestamp": 101
                }
            ]
        });

        let parsed: CompletionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.session, "doc-1");
        assert_eq!(parsed.message.len(), 2);
        assert_eq!(parsed.message[1].message, "hi");
    }
}
