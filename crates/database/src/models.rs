//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Description given to a session that has not had its first exchange yet.
/// Rewritten exactly once by the summarizer after the first user turn.
pub const PLACEHOLDER_DESCRIPTION: &str = "New Chat";

/// Lifecycle status of a chat session. Deletion is logical: the status flips
/// to `INACTIVE` and the session never surfaces in listings again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Active,
    Inactive,
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One conversation thread owned by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Store-assigned document handle, needed for update-by-reference.
    pub id: String,
    /// Owning device identifier.
    pub device_id: String,
    /// Client-assigned UUID used to scope message queries.
    pub session_id: String,
    /// Human-readable summary, starts as [`PLACEHOLDER_DESCRIPTION`].
    pub description: String,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Creation timestamp (RFC 3339-ish datetime string).
    pub created_at: String,
    /// Last-activity ordering key, unix milliseconds.
    pub updated_at: i64,
}

/// One turn in a conversation. Append-only; never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Store row id, the keyset pagination tiebreaker.
    pub id: i64,
    /// Stable message identifier (client or server minted UUID).
    pub message_id: String,
    /// Owning device identifier.
    pub device_id: String,
    /// Session this message belongs to (client-assigned session UUID).
    pub session_id: String,
    /// Author role.
    pub role: Role,
    /// Message text.
    pub message: String,
    /// Creation timestamp (datetime string).
    pub created_at: String,
    /// Retrieval ordering key, unix milliseconds.
    pub timestamp: i64,
}

/// Fields required to insert a message. The store mints the row id.
#[derive(Debug, Clone)]
pub struct NewMessage<'a> {
    pub message_id: &'a str,
    pub device_id: &'a str,
    pub session_id: &'a str,
    pub role: Role,
    pub message: &'a str,
    pub timestamp: i64,
}

/// Keyset cursor over the session listing (`updated_at` DESC, `id` DESC).
/// Built from the last item of the previous page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCursor {
    pub updated_at: i64,
    pub id: String,
}

impl From<&Session> for SessionCursor {
    fn from(session: &Session) -> Self {
        Self {
            updated_at: session.updated_at,
            id: session.id.clone(),
        }
    }
}

/// Keyset cursor over a session's messages (`timestamp` DESC, `id` DESC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCursor {
    pub timestamp: i64,
    pub id: i64,
}

impl From<&Message> for MessageCursor {
    fn from(message: &Message) -> Self {
        Self {
            timestamp: message.timestamp,
            id: message.id,
        }
    }
}
