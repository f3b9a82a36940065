//! Scripted brain - replies from a fixed script and records calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use brain_core::{Brain, BrainError, ChatTurn};
use tokio::sync::Mutex;

/// One recorded completion call, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCall {
    /// Number of history turns supplied with the call.
    pub history_len: usize,
    /// The user message supplied with the call.
    pub message: String,
}

/// A brain that pops replies from a script, in order.
///
/// Once the script is exhausted it falls back to a fixed default reply,
/// so tests can keep sending without re-stocking. Every call is recorded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBrain {
    replies: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<Mutex<Vec<CompletionCall>>>,
}

impl ScriptedBrain {
    /// Create a brain with the given scripted replies.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Arc::new(Mutex::new(
                replies.into_iter().map(Into::into).collect(),
            )),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of completions served so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Snapshot of every call made so far, oldest first.
    pub async fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn complete(
        &self,
        _system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, BrainError> {
        self.calls.lock().await.push(CompletionCall {
            history_len: history.len(),
            message: message.to_string(),
        });

        let reply = self.replies.lock().await.pop_front();
        Ok(reply.unwrap_or_else(|| "(scripted reply)".to_string()))
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_then_fallback() {
        let brain = ScriptedBrain::new(["first", "second"]);

        assert_eq!(brain.complete("", &[], "a").await.unwrap(), "first");
        assert_eq!(brain.complete("", &[], "b").await.unwrap(), "second");
        assert_eq!(
            brain.complete("", &[], "c").await.unwrap(),
            "(scripted reply)"
        );
    }

    #[tokio::test]
    async fn test_records_calls() {
        let brain = ScriptedBrain::new(["ok"]);
        let history = vec![ChatTurn::user("hi"), ChatTurn::model("hello")];

        brain.complete("sys", &history, "next").await.unwrap();

        assert_eq!(brain.call_count().await, 1);
        let calls = brain.calls().await;
        assert_eq!(calls[0].history_len, 2);
        assert_eq!(calls[0].message, "next");
    }

    #[tokio::test]
    async fn test_clones_share_script() {
        let brain = ScriptedBrain::new(["only"]);
        let clone = brain.clone();

        assert_eq!(clone.complete("", &[], "x").await.unwrap(), "only");
        assert_eq!(brain.call_count().await, 1);
    }
}
