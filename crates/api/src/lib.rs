//! Chat completion service for the Kiki portfolio chat widget.
//!
//! Exposes a single `POST /chat` endpoint that, given one user turn, produces
//! and persists the assistant turn, and lazily derives the session
//! description on the first exchange. See [`routes::chat`] for the full
//! request cycle.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{ApiError, Result};
pub use state::AppState;
