//! Gemini-based brain implementation.
//!
//! Implements the [`brain_core::Brain`] trait against the Google Gemini
//! `generateContent` REST API. The same implementation serves both the
//! primary responder and the lightweight summarizer; they differ only in the
//! configured model name.

mod api_types;
mod brain;
mod config;

pub use api_types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
pub use brain::GeminiBrain;
pub use config::{GeminiConfig, GeminiConfigBuilder, DEFAULT_PROMPT_FILE};
