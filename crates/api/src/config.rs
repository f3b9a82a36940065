//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Default system prompt used when no prompt file or env override exists.
const DEFAULT_SYSTEM_PROMPT: &str = "You are Kiki, a friendly assistant embedded in a personal \
portfolio website. Answer questions about the site owner's experience, projects, and skills. \
Keep answers short and conversational.";

/// Default prompt file consulted when `CHAT_SYSTEM_PROMPT` is unset.
const DEFAULT_PROMPT_FILE: &str = "PROMPT.md";

/// Chat completion service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// System prompt sent ahead of every responder completion.
    pub system_prompt: String,
    /// Model used for the lightweight description summarizer.
    pub summary_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CHAT_API_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:kiki.db?mode=rwc` |
    /// | `CHAT_SYSTEM_PROMPT` | Responder system prompt | (prompt file, then built-in) |
    /// | `CHAT_PROMPT_FILE` | Responder prompt file | `PROMPT.md` |
    /// | `CHAT_SUMMARY_MODEL` | Summarizer model name | `gemini-1.5-flash` |
    ///
    /// The responder model and API key come from the `GEMINI_*` variables
    /// read by `gemini_brain::GeminiConfig::from_env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("CHAT_API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            env::var("SQLITE_PATH").unwrap_or_else(|_| "sqlite:kiki.db?mode=rwc".to_string());

        let system_prompt = match env::var("CHAT_SYSTEM_PROMPT") {
            Ok(prompt) => prompt,
            Err(_) => {
                let prompt_file = env::var("CHAT_PROMPT_FILE")
                    .unwrap_or_else(|_| DEFAULT_PROMPT_FILE.to_string());
                match std::fs::read_to_string(&prompt_file) {
                    Ok(content) if !content.trim().is_empty() => content.trim().to_string(),
                    _ => DEFAULT_SYSTEM_PROMPT.to_string(),
                }
            }
        };

        let summary_model =
            env::var("CHAT_SUMMARY_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());

        Ok(Self {
            addr,
            database_url,
            system_prompt,
            summary_model,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CHAT_API_ADDR format")]
    InvalidAddr,
}
