//! Error types for the chat widget core.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by the widget stores and controller.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Completion transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Device identity file could not be read or written.
    #[error("identity error: {0}")]
    Identity(#[from] std::io::Error),

    /// An operation referenced a session the store does not hold.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// Retry referenced a message that is not in a failed state.
    #[error("no failed message with id {0}")]
    NotRetryable(String),
}

/// Result type for widget operations.
pub type Result<T> = std::result::Result<T, WidgetError>;
