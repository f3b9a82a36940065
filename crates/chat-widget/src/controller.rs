//! The widget controller: one object a rendering layer drives.
//!
//! Owns the session and message stores plus the completion transport, and
//! sequences the interactions between them: bootstrap, session switching,
//! optimistic sends with reconciliation, and retry of failed sends. The
//! typing indicator brackets every completion round trip and is cleared on
//! both the success and the failure path.

use chrono::Utc;
use database::Message;
use database::Role;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::device::DeviceIdentity;
use crate::error::{Result, WidgetError};
use crate::messages::MessageStore;
use crate::sessions::SessionStore;
use crate::transport::{CompletionRequest, CompletionTransport};

/// Greeting shown in a session that has no stored messages yet. Local only:
/// never persisted and never part of model history.
const WELCOME_TEXT: &str =
    "Hi! I'm Kiki. Ask me anything about the projects and experience on this site.";

/// Result of a send attempt. A sent message implies
/// [`ScrollEffect::ToLatest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message went out (the log now holds the reconciled exchange).
    Sent,
    /// A guard dropped the attempt: blank input, no active session, or a
    /// round trip already in flight. Nothing changed.
    Ignored,
}

/// How the viewport should react to an operation that changed the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEffect {
    /// Jump to the newest message (send, initial load, session switch).
    ToLatest,
    /// Content was prepended; hold the anchor message in place via
    /// [`ScrollMetrics::preserve_offset`](crate::viewport::ScrollMetrics::preserve_offset).
    PreserveAnchor,
    /// Nothing changed on screen.
    None,
}

/// Headless chat widget controller, generic over the completion transport.
pub struct ChatController<T: CompletionTransport> {
    pool: SqlitePool,
    device: DeviceIdentity,
    sessions: SessionStore,
    messages: MessageStore,
    transport: T,
    active: Option<String>,
    typing: bool,
}

impl<T: CompletionTransport> ChatController<T> {
    pub fn new(pool: SqlitePool, device: DeviceIdentity, transport: T) -> Self {
        Self {
            sessions: SessionStore::new(pool.clone(), device.id()),
            messages: MessageStore::new(pool.clone()),
            pool,
            device,
            transport,
            active: None,
            typing: false,
        }
    }

    /// Register the device, load the first session page, and select a
    /// session, creating one if the device has none.
    pub async fn initialize(&mut self, user_agent: &str) -> Result<ScrollEffect> {
        self.device.register(&self.pool, user_agent).await?;
        self.sessions.load_more().await?;

        match self.sessions.sessions().first().cloned() {
            Some(first) => self.select_session(&first.id).await,
            None => {
                self.new_session().await?;
                Ok(ScrollEffect::ToLatest)
            }
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    /// Store document id of the selected session.
    pub fn active_session_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Whether a completion round trip is in flight.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Fetch the next page of the session listing.
    pub async fn load_more_sessions(&mut self) -> Result<usize> {
        self.sessions.load_more().await
    }

    /// Backfill a page of older messages for the selected session. Reports
    /// [`ScrollEffect::PreserveAnchor`] when entries were prepended, so the
    /// caller can keep the viewport anchored.
    pub async fn load_older_messages(&mut self) -> Result<ScrollEffect> {
        let added = self.messages.load_older().await?;
        Ok(if added > 0 {
            ScrollEffect::PreserveAnchor
        } else {
            ScrollEffect::None
        })
    }

    /// Make a session the active one and load its newest messages. An empty
    /// session gets the local greeting.
    pub async fn select_session(&mut self, id: &str) -> Result<ScrollEffect> {
        let session = self
            .sessions
            .get(id)
            .cloned()
            .ok_or_else(|| WidgetError::UnknownSession(id.to_string()))?;

        self.messages.load(&session.session_id, false).await?;
        if self.messages.entries().is_empty() {
            self.messages.seed(self.greeting(&session.session_id));
        }
        self.active = Some(session.id);
        Ok(ScrollEffect::ToLatest)
    }

    /// Create a fresh session, select it, and greet.
    pub async fn new_session(&mut self) -> Result<String> {
        let created = self.sessions.create().await?;
        self.messages.load(&created.session_id, true).await?;
        self.messages.seed(self.greeting(&created.session_id));
        self.active = Some(created.id.clone());
        Ok(created.id)
    }

    /// Soft-delete a session. Deleting the active session falls back to the
    /// next remaining one, or to a fresh session when none remain.
    pub async fn delete_session(&mut self, id: &str) -> Result<()> {
        self.sessions.delete(id).await?;

        if self.active.as_deref() == Some(id) {
            self.active = None;
            match self.sessions.sessions().first().cloned() {
                Some(next) => {
                    self.select_session(&next.id).await?;
                }
                None => {
                    self.new_session().await?;
                }
            }
        }
        Ok(())
    }

    /// Send one user message through the completion service.
    ///
    /// Appends the message optimistically, raises the typing indicator, and
    /// on success reconciles the stored exchange, applies the (rename-once)
    /// description, and bumps the session to the top of the listing. On
    /// failure the entry is marked failed and kept for
    /// [`retry_message`](Self::retry_message); the error propagates.
    pub async fn send_message(&mut self, text: &str) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() || self.typing {
            return Ok(SendOutcome::Ignored);
        }
        let active = match self.active.clone() {
            Some(id) => id,
            None => return Ok(SendOutcome::Ignored),
        };

        let optimistic_id = self.messages.append_optimistic(self.device.id(), text);
        self.round_trip(&active, &optimistic_id, text).await
    }

    /// Resend a failed message. Only entries in the failed state are
    /// retryable; everything else errors without touching the log.
    pub async fn retry_message(&mut self, message_id: &str) -> Result<SendOutcome> {
        if self.typing {
            return Ok(SendOutcome::Ignored);
        }
        let active = match self.active.clone() {
            Some(id) => id,
            None => return Ok(SendOutcome::Ignored),
        };
        let text = self
            .messages
            .begin_retry(message_id)
            .ok_or_else(|| WidgetError::NotRetryable(message_id.to_string()))?;

        self.round_trip(&active, message_id, &text).await
    }

    async fn round_trip(
        &mut self,
        active: &str,
        optimistic_id: &str,
        text: &str,
    ) -> Result<SendOutcome> {
        self.typing = true;

        let request = CompletionRequest {
            device_id: self.device.id().to_string(),
            session_id: active.to_string(),
            message: text.to_string(),
        };
        let result = self.transport.complete(request).await;

        // The indicator comes down no matter how the round trip ended.
        self.typing = false;

        match result {
            Ok(response) => {
                self.messages.reconcile(optimistic_id, &response.message);
                self.sessions.apply_description(active, &response.description);
                self.sessions.touch(active).await?;
                debug!(session = active, "Completed exchange");
                Ok(SendOutcome::Sent)
            }
            Err(err) => {
                warn!(session = active, error = %err, "Send failed");
                self.messages.mark_failed(optimistic_id);
                Err(err.into())
            }
        }
    }

    fn greeting(&self, session_id: &str) -> Message {
        let now = Utc::now();
        Message {
            id: 0,
            message_id: format!("msg_{}", Uuid::new_v4()),
            device_id: self.device.id().to_string(),
            session_id: session_id.to_string(),
            role: Role::Model,
            message: WELCOME_TEXT.to_string(),
            created_at: now.to_rfc3339(),
            timestamp: now.timestamp_millis(),
        }
    }
}
