//! Application state shared across handlers.

use std::sync::Arc;

use brain_core::Brain;
use sqlx::SqlitePool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: SqlitePool,
    /// Primary completion model.
    pub responder: Arc<dyn Brain>,
    /// Lightweight model used once per session to derive its description.
    pub summarizer: Arc<dyn Brain>,
    /// System prompt sent ahead of every responder completion.
    pub system_prompt: Arc<str>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        pool: SqlitePool,
        responder: Arc<dyn Brain>,
        summarizer: Arc<dyn Brain>,
        system_prompt: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            pool,
            responder,
            summarizer,
            system_prompt: system_prompt.into(),
        }
    }
}
