//! Message persistence: append-only inserts and newest-first paginated reads.

use sqlx::SqlitePool;

use crate::models::{Message, MessageCursor, NewMessage};
use crate::{DatabaseError, Result};

const MESSAGE_COLUMNS: &str =
    "id, message_id, device_id, session_id, role, message, created_at, timestamp";

/// Insert a message and return the stored row.
///
/// `message_id` must be unique; a duplicate insert fails with
/// [`DatabaseError::AlreadyExists`].
pub async fn insert_message(pool: &SqlitePool, new: &NewMessage<'_>) -> Result<Message> {
    let result = sqlx::query(
        r#"
        INSERT INTO messages (message_id, device_id, session_id, role, message, timestamp)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.message_id)
    .bind(new.device_id)
    .bind(new.session_id)
    .bind(new.role)
    .bind(new.message)
    .bind(new.timestamp)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "message", new.message_id))?;

    get_message(pool, result.last_insert_rowid()).await
}

/// Fetch one page of a session's messages, newest first.
///
/// Without a cursor this returns the most recent `limit` messages; with a
/// cursor (built from the last item of the previous page) it returns the next
/// window of older history. Callers reverse the page before display so the
/// visible order stays chronological.
pub async fn list_recent_messages(
    pool: &SqlitePool,
    session_id: &str,
    cursor: Option<&MessageCursor>,
    limit: i64,
) -> Result<Vec<Message>> {
    let messages = match cursor {
        Some(cursor) => {
            sqlx::query_as::<_, Message>(&format!(
                r#"
                SELECT {MESSAGE_COLUMNS}
                FROM messages
                WHERE session_id = ?
                  AND (timestamp < ? OR (timestamp = ? AND id < ?))
                ORDER BY timestamp DESC, id DESC
                LIMIT ?
                "#
            ))
            .bind(session_id)
            .bind(cursor.timestamp)
            .bind(cursor.timestamp)
            .bind(cursor.id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Message>(&format!(
                r#"
                SELECT {MESSAGE_COLUMNS}
                FROM messages
                WHERE session_id = ?
                ORDER BY timestamp DESC, id DESC
                LIMIT ?
                "#
            ))
            .bind(session_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(messages)
}

/// Get a message by its store row id.
pub async fn get_message(pool: &SqlitePool, id: i64) -> Result<Message> {
    let message = sqlx::query_as::<_, Message>(&format!(
        r#"
        SELECT {MESSAGE_COLUMNS}
        FROM messages
        WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    message.ok_or_else(|| DatabaseError::NotFound {
        entity: "message",
        id: id.to_string(),
    })
}
