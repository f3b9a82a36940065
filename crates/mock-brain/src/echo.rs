//! Echo brain implementation - echoes the user message back.

use async_trait::async_trait;
use brain_core::{Brain, BrainError, ChatTurn};

/// A simple brain that echoes the user message back.
///
/// Useful for wiring tests that need a real reply without any scripting.
#[derive(Debug, Clone, Default)]
pub struct EchoBrain {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoBrain {
    /// Create a new EchoBrain with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoBrain with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoBrain;
    ///
    /// let brain = EchoBrain::with_prefix("Echo: ");
    /// // Will respond with "Echo: <user message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl Brain for EchoBrain {
    async fn complete(
        &self,
        _system_prompt: &str,
        _history: &[ChatTurn],
        message: &str,
    ) -> Result<String, BrainError> {
        let reply = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, message),
            None => message.to_string(),
        };

        Ok(reply)
    }

    fn name(&self) -> &str {
        "EchoBrain"
    }
}
