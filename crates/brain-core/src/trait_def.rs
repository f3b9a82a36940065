//! The Brain trait definition.

use async_trait::async_trait;

use crate::error::BrainError;
use crate::turn::ChatTurn;

/// A trait for producing model completions from conversation context.
///
/// Implementations range from scripted test doubles to hosted generative-AI
/// APIs. This trait is object-safe and can be used with `Box<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Produce a reply to `message` given a system prompt and chronological
    /// (oldest-first) conversation history.
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, BrainError>;

    /// Get a human-readable name for this brain implementation.
    fn name(&self) -> &str;

    /// Check if the brain is ready to serve completions.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl Brain for Fixed {
        async fn complete(
            &self,
            _system_prompt: &str,
            history: &[ChatTurn],
            message: &str,
        ) -> Result<String, BrainError> {
            Ok(format!("{} turns, last: {}", history.len(), message))
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    #[tokio::test]
    async fn test_object_safety_and_defaults() {
        let brain: Box<dyn Brain> = Box::new(Fixed);
        assert!(brain.is_ready().await);
        assert_eq!(brain.name(), "Fixed");

        let history = vec![ChatTurn::user("a"), ChatTurn::model("b")];
        let reply = brain.complete("sys", &history, "c").await.unwrap();
        assert_eq!(reply, "2 turns, last: c");
    }
}
