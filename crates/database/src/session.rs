//! Session persistence: creation, listing, soft deletion, touch.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Session, SessionCursor};
use crate::{DatabaseError, Result};

const SESSION_COLUMNS: &str =
    "id, device_id, session_id, description, status, created_at, updated_at";

/// Insert a new ACTIVE session and return it.
///
/// The store mints the document handle (`id`); the caller supplies the
/// client-assigned `session_id`.
pub async fn create_session(
    pool: &SqlitePool,
    device_id: &str,
    session_id: &str,
    description: &str,
) -> Result<Session> {
    let id = Uuid::new_v4().to_string();
    let updated_at = Utc::now().timestamp_millis();

    sqlx::query(
        r#"
        INSERT INTO sessions (id, device_id, session_id, description, status, updated_at)
        VALUES (?, ?, ?, ?, 'ACTIVE', ?)
        "#,
    )
    .bind(&id)
    .bind(device_id)
    .bind(session_id)
    .bind(description)
    .bind(updated_at)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "session", session_id))?;

    tracing::debug!(session_id, device_id, "Created session");

    get_session(pool, &id).await
}

/// List a device's ACTIVE sessions, most recently updated first.
///
/// A cursor (built from the last item of the previous page) fetches the next
/// page; re-running the same query with the same cursor and no intervening
/// writes returns the same page.
pub async fn list_active_sessions(
    pool: &SqlitePool,
    device_id: &str,
    cursor: Option<&SessionCursor>,
    limit: i64,
) -> Result<Vec<Session>> {
    let sessions = match cursor {
        Some(cursor) => {
            sqlx::query_as::<_, Session>(&format!(
                r#"
                SELECT {SESSION_COLUMNS}
                FROM sessions
                WHERE device_id = ? AND status = 'ACTIVE'
                  AND (updated_at < ? OR (updated_at = ? AND id < ?))
                ORDER BY updated_at DESC, id DESC
                LIMIT ?
                "#
            ))
            .bind(device_id)
            .bind(cursor.updated_at)
            .bind(cursor.updated_at)
            .bind(&cursor.id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Session>(&format!(
                r#"
                SELECT {SESSION_COLUMNS}
                FROM sessions
                WHERE device_id = ? AND status = 'ACTIVE'
                ORDER BY updated_at DESC, id DESC
                LIMIT ?
                "#
            ))
            .bind(device_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(sessions)
}

/// Get a session by its store-assigned document handle.
pub async fn get_session(pool: &SqlitePool, id: &str) -> Result<Session> {
    let session = sqlx::query_as::<_, Session>(&format!(
        r#"
        SELECT {SESSION_COLUMNS}
        FROM sessions
        WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    session.ok_or_else(|| DatabaseError::NotFound {
        entity: "session",
        id: id.to_string(),
    })
}

/// Rewrite a session's description.
pub async fn set_description(pool: &SqlitePool, id: &str, description: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET description = ?
        WHERE id = ?
        "#,
    )
    .bind(description)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "session",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Logically delete a session by flipping its status to INACTIVE.
///
/// Inactive sessions are excluded from all listing queries and never
/// resurface.
pub async fn mark_inactive(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET status = 'INACTIVE'
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "session",
            id: id.to_string(),
        });
    }

    tracing::debug!(id, "Marked session inactive");
    Ok(())
}

/// Write a fresh `updated_at` so the session sorts to the top of listings.
pub async fn touch(pool: &SqlitePool, id: &str, updated_at: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "session",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionStatus;
    use crate::test_db;

    async fn seed_sessions(pool: &SqlitePool, device_id: &str, count: usize) -> Vec<Session> {
        let mut sessions = Vec::new();
        for i in 0..count {
            let session = create_session(
                pool,
                device_id,
                &format!("sess-{device_id}-{i}"),
                "New Chat",
            )
            .await
            .unwrap();
            // Spread the ordering key so the listing order is deterministic.
            touch(pool, &session.id, 1_000 + i as i64).await.unwrap();
            sessions.push(get_session(pool, &session.id).await.unwrap());
        }
        sessions
    }

    #[tokio::test]
    async fn test_listing_orders_by_updated_at_desc() {
        let db = test_db().await;
        let seeded = seed_sessions(db.pool(), "dev-1", 3).await;

        let page = list_active_sessions(db.pool(), "dev-1", None, 10)
            .await
            .unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].id, seeded[2].id);
        assert_eq!(page[2].id, seeded[0].id);
    }

    #[tokio::test]
    async fn test_cursor_pagination_is_idempotent() {
        let db = test_db().await;
        seed_sessions(db.pool(), "dev-1", 7).await;

        let first = list_active_sessions(db.pool(), "dev-1", None, 3)
            .await
            .unwrap();
        assert_eq!(first.len(), 3);

        let cursor = SessionCursor::from(first.last().unwrap());
        let second = list_active_sessions(db.pool(), "dev-1", Some(&cursor), 3)
            .await
            .unwrap();
        let second_again = list_active_sessions(db.pool(), "dev-1", Some(&cursor), 3)
            .await
            .unwrap();

        assert_eq!(second, second_again);
        // No overlap with the first page.
        for session in &second {
            assert!(!first.iter().any(|s| s.id == session.id));
        }
    }

    #[tokio::test]
    async fn test_inactive_sessions_excluded_from_listing() {
        let db = test_db().await;
        let seeded = seed_sessions(db.pool(), "dev-1", 2).await;

        mark_inactive(db.pool(), &seeded[0].id).await.unwrap();

        let page = list_active_sessions(db.pool(), "dev-1", None, 10)
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, seeded[1].id);

        let deleted = get_session(db.pool(), &seeded[0].id).await.unwrap();
        assert_eq!(deleted.status, SessionStatus::Inactive);
    }

    #[tokio::test]
    async fn test_listing_scoped_to_device() {
        let db = test_db().await;
        seed_sessions(db.pool(), "dev-a", 2).await;
        seed_sessions(db.pool(), "dev-b", 1).await;

        let page = list_active_sessions(db.pool(), "dev-a", None, 10)
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|s| s.device_id == "dev-a"));
    }

    #[tokio::test]
    async fn test_duplicate_session_id_rejected() {
        let db = test_db().await;
        create_session(db.pool(), "dev-1", "sess-dup", "New Chat")
            .await
            .unwrap();

        let err = create_session(db.pool(), "dev-1", "sess-dup", "New Chat")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_touch_and_description_updates() {
        let db = test_db().await;
        let session = create_session(db.pool(), "dev-1", "sess-1", "New Chat")
            .await
            .unwrap();

        touch(db.pool(), &session.id, 99_999).await.unwrap();
        set_description(db.pool(), &session.id, "Rust experience questions")
            .await
            .unwrap();

        let updated = get_session(db.pool(), &session.id).await.unwrap();
        assert_eq!(updated.updated_at, 99_999);
        assert_eq!(updated.description, "Rust experience questions");

        let missing = touch(db.pool(), "no-such-id", 1).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }
}
