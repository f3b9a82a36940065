//! The session list: a paginated, most-recently-active-first view of one
//! device's conversations.
//!
//! The store mirrors the persisted listing locally so the UI can render and
//! reorder without a round trip, and only goes back to the database for the
//! next page or for writes.

use chrono::Utc;
use database::{session, Session, SessionCursor, PLACEHOLDER_DESCRIPTION};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, WidgetError};
use crate::fetch::FetchState;

/// Sessions fetched per page.
pub const SESSION_PAGE_SIZE: i64 = 10;

/// Paginated local view of a device's active sessions.
pub struct SessionStore {
    pool: SqlitePool,
    device_id: String,
    sessions: Vec<Session>,
    cursor: Option<SessionCursor>,
    fetch: FetchState,
}

impl SessionStore {
    pub fn new(pool: SqlitePool, device_id: impl Into<String>) -> Self {
        Self {
            pool,
            device_id: device_id.into(),
            sessions: Vec::new(),
            cursor: None,
            fetch: FetchState::default(),
        }
    }

    /// Sessions loaded so far, most recently active first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch
    }

    /// Look up a loaded session by its store document id.
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Fetch and append the next page. Returns the number of sessions added;
    /// zero when a fetch is already running or the listing is exhausted.
    pub async fn load_more(&mut self) -> Result<usize> {
        if !self.fetch.try_begin() {
            return Ok(0);
        }

        let result = session::list_active_sessions(
            &self.pool,
            &self.device_id,
            self.cursor.as_ref(),
            SESSION_PAGE_SIZE,
        )
        .await;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                self.fetch.finish(false);
                return Err(err.into());
            }
        };

        let exhausted = (page.len() as i64) < SESSION_PAGE_SIZE;
        if let Some(last) = page.last() {
            self.cursor = Some(SessionCursor::from(last));
        }
        let added = page.len();
        self.sessions.extend(page);
        self.fetch.finish(exhausted);

        debug!(added, exhausted, "Loaded session page");
        Ok(added)
    }

    /// Create a fresh placeholder-named session and put it at the top of the
    /// local list.
    pub async fn create(&mut self) -> Result<Session> {
        let session_id = Uuid::new_v4().to_string();
        let created = session::create_session(
            &self.pool,
            &self.device_id,
            &session_id,
            PLACEHOLDER_DESCRIPTION,
        )
        .await?;

        self.sessions.insert(0, created.clone());
        Ok(created)
    }

    /// Soft-delete a session: it disappears from the local list immediately
    /// and the row is flipped to INACTIVE. The removal is not rolled back on
    /// a persistence failure; the next full reload converges.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return Err(WidgetError::UnknownSession(id.to_string()));
        }

        session::mark_inactive(&self.pool, id).await?;
        Ok(())
    }

    /// Bump a session's activity key and move it to the top of the list.
    /// A session already at the top is left alone, persisted copy included.
    pub async fn touch(&mut self, id: &str) -> Result<()> {
        match self.sessions.iter().position(|s| s.id == id) {
            None => Err(WidgetError::UnknownSession(id.to_string())),
            Some(0) => Ok(()),
            Some(index) => {
                let updated_at = Utc::now().timestamp_millis();
                session::touch(&self.pool, id, updated_at).await?;

                let mut moved = self.sessions.remove(index);
                moved.updated_at = updated_at;
                self.sessions.insert(0, moved);
                Ok(())
            }
        }
    }

    /// Apply a server-derived description to the local copy, but only while
    /// it still carries the placeholder. Renaming happens once.
    pub fn apply_description(&mut self, id: &str, description: &str) {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) {
            if session.description == PLACEHOLDER_DESCRIPTION {
                session.description = description.to_string();
            }
        }
    }

    /// Drop all local state; the next [`load_more`](Self::load_more) starts
    /// from the first page.
    pub fn reset(&mut self) {
        self.sessions.clear();
        self.cursor = None;
        self.fetch.reset();
    }
}
