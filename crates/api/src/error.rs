//! Error types for the chat completion service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors that can occur while serving a chat completion.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required request field is missing or empty.
    #[error("missing parameters")]
    MissingParameters,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Model backend error.
    #[error("brain error: {0}")]
    Brain(#[from] brain_core::BrainError),
}

impl IntoResponse for ApiError {
    /// Collapse everything but input validation into the generic 500 body.
    ///
    /// The caller cannot distinguish partial success (e.g. the user message
    /// was saved but the reply was not); details stay in the server log.
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingParameters => (StatusCode::BAD_REQUEST, "Missing parameters"),
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            ApiError::Brain(err) => {
                tracing::error!("Brain error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ApiError>;
