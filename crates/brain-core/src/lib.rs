//! Core trait and types for completion-model backends.
//!
//! This crate provides the shared interface between the chat completion
//! service and the generative-model implementations behind it. It defines:
//!
//! - [`Brain`] - The trait every model backend implements
//! - [`ChatTurn`] / [`TurnRole`] - Conversation history types
//! - [`BrainError`] - Error types for brain operations
//!
//! # Example
//!
//! ```rust
//! use brain_core::{Brain, BrainError, ChatTurn};
//! use async_trait::async_trait;
//!
//! struct MyBrain;
//!
//! #[async_trait]
//! impl Brain for MyBrain {
//!     async fn complete(
//!         &self,
//!         _system_prompt: &str,
//!         _history: &[ChatTurn],
//!         message: &str,
//!     ) -> Result<String, BrainError> {
//!         Ok(format!("You said: {message}"))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "MyBrain"
//!     }
//! }
//! ```

mod error;
mod trait_def;
mod turn;

pub use error::BrainError;
pub use trait_def::Brain;
pub use turn::{ChatTurn, TurnRole};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
