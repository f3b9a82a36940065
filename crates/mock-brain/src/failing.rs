//! Failing brain - every completion errors.

use async_trait::async_trait;
use brain_core::{Brain, BrainError, ChatTurn};

/// A brain whose completions always fail.
///
/// Drives the generic server-error path in service tests.
#[derive(Debug, Clone, Default)]
pub struct FailingBrain;

impl FailingBrain {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Brain for FailingBrain {
    async fn complete(
        &self,
        _system_prompt: &str,
        _history: &[ChatTurn],
        _message: &str,
    ) -> Result<String, BrainError> {
        Err(BrainError::Api {
            status: 503,
            message: "model unavailable".to_string(),
        })
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_fails() {
        let brain = FailingBrain::new();
        let result = brain.complete("", &[], "hello").await;
        assert!(matches!(result, Err(BrainError::Api { status: 503, .. })));
        assert!(!brain.is_ready().await);
    }
}
