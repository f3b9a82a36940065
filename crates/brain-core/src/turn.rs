//! Conversation history types.

use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
///
/// The wire names match the persisted message roles: `user` and `model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    /// Wire name for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// A single turn in a conversation, oldest-first when collected into history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Create a model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let turn = ChatTurn::user("hello");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.text, "hello");

        let turn = ChatTurn::model("hi there");
        assert_eq!(turn.role, TurnRole::Model);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(TurnRole::User.as_str(), "user");
        assert_eq!(TurnRole::Model.as_str(), "model");
        assert_eq!(
            serde_json::to_string(&TurnRole::Model).unwrap(),
            "\"model\""
        );
    }
}
