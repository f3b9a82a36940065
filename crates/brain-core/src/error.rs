//! Brain error types.

use thiserror::Error;

/// Errors that can occur while producing a completion.
#[derive(Debug, Error)]
pub enum BrainError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure reaching the model API.
    #[error("network error: {0}")]
    Network(String),

    /// The model API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model returned a response with no usable text.
    #[error("model returned an empty response")]
    EmptyResponse,
}
