//! The message log for the selected session.
//!
//! Holds messages in chronological order with a delivery state attached to
//! each. New pages of history are fetched newest-first from the store,
//! reversed, and prepended; optimistic sends append pending entries that get
//! reconciled (or marked failed) when the completion round trip resolves.

use chrono::Utc;
use database::{message, Message, MessageCursor, Role};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::fetch::FetchState;

/// Messages fetched per history page.
pub const MESSAGE_PAGE_SIZE: i64 = 10;

/// Prefix on optimistic (not-yet-persisted) message ids, so they can never
/// collide with store-minted UUIDs.
const OPTIMISTIC_ID_PREFIX: &str = "msg_";

/// Delivery state of one log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Persisted in the store.
    Confirmed,
    /// Sent optimistically; the completion round trip is still in flight.
    Pending,
    /// The round trip failed; eligible for retry.
    Failed,
}

/// One rendered message plus its delivery state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub message: Message,
    pub delivery: Delivery,
}

impl LogEntry {
    fn confirmed(message: Message) -> Self {
        Self {
            message,
            delivery: Delivery::Confirmed,
        }
    }
}

/// Chronological message log with keyset backfill and optimistic appends.
pub struct MessageStore {
    pool: SqlitePool,
    session_id: Option<String>,
    entries: Vec<LogEntry>,
    cursor: Option<MessageCursor>,
    fetch: FetchState,
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            session_id: None,
            entries: Vec::new(),
            cursor: None,
            fetch: FetchState::default(),
        }
    }

    /// Entries in chronological order, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch
    }

    /// The client session UUID this log is bound to.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Bind the log to a session and load its newest page. Re-loading the
    /// session the log is already bound to is a no-op unless `force` is set.
    pub async fn load(&mut self, session_id: &str, force: bool) -> Result<usize> {
        if self.session_id.as_deref() == Some(session_id) && !force {
            return Ok(0);
        }

        self.session_id = Some(session_id.to_string());
        self.entries.clear();
        self.cursor = None;
        self.fetch.reset();

        self.load_older().await
    }

    /// Fetch the next page of older history and prepend it. Returns the
    /// number of entries added; zero when a fetch is already running, the
    /// history is exhausted, or no session is bound.
    pub async fn load_older(&mut self) -> Result<usize> {
        let session_id = match &self.session_id {
            Some(id) => id.clone(),
            None => return Ok(0),
        };
        if !self.fetch.try_begin() {
            return Ok(0);
        }

        let result = message::list_recent_messages(
            &self.pool,
            &session_id,
            self.cursor.as_ref(),
            MESSAGE_PAGE_SIZE,
        )
        .await;

        let mut page = match result {
            Ok(page) => page,
            Err(err) => {
                self.fetch.finish(false);
                return Err(err.into());
            }
        };

        let exhausted = (page.len() as i64) < MESSAGE_PAGE_SIZE;
        // The page arrives newest-first; its last element is the oldest
        // message seen so far and becomes the next cursor.
        if let Some(oldest) = page.last() {
            self.cursor = Some(MessageCursor::from(oldest));
        }
        page.reverse();

        // Keep-first dedupe: an id already in the log (confirmed via a send
        // reconciliation, say) wins over the fetched copy.
        let mut added = 0;
        let mut prepend: Vec<LogEntry> = Vec::with_capacity(page.len());
        for message in page {
            if self.contains(&message.message_id) {
                continue;
            }
            prepend.push(LogEntry::confirmed(message));
            added += 1;
        }
        prepend.append(&mut self.entries);
        self.entries = prepend;
        self.fetch.finish(exhausted);

        debug!(added, exhausted, "Loaded message page");
        Ok(added)
    }

    /// Append a locally minted pending user message and return its id.
    pub fn append_optimistic(&mut self, device_id: &str, text: &str) -> String {
        let session_id = self.session_id.clone().unwrap_or_default();
        let message_id = format!("{OPTIMISTIC_ID_PREFIX}{}", Uuid::new_v4());
        let now = Utc::now();

        self.entries.push(LogEntry {
            message: Message {
                id: 0,
                message_id: message_id.clone(),
                device_id: device_id.to_string(),
                session_id,
                role: Role::User,
                message: text.to_string(),
                created_at: now.to_rfc3339(),
                timestamp: now.timestamp_millis(),
            },
            delivery: Delivery::Pending,
        });

        message_id
    }

    /// Replace the pending entry with the stored copies from a completed
    /// round trip: the persisted user message lands in the pending entry's
    /// slot, everything else is appended (deduplicated by id).
    pub fn reconcile(&mut self, optimistic_id: &str, stored: &[Message]) {
        let mut stored = stored.iter();

        if let Some(index) = self.position(optimistic_id) {
            if let Some(user_message) = stored.next() {
                self.entries[index] = LogEntry::confirmed(user_message.clone());
            }
        }

        for message in stored {
            if !self.contains(&message.message_id) {
                self.entries.push(LogEntry::confirmed(message.clone()));
            }
        }
    }

    /// Flip a pending entry to failed. Unknown ids are ignored.
    pub fn mark_failed(&mut self, optimistic_id: &str) {
        if let Some(index) = self.position(optimistic_id) {
            self.entries[index].delivery = Delivery::Failed;
        }
    }

    /// Flip a failed entry back to pending for a retry. Returns the entry's
    /// text, or `None` if the id is unknown or not failed.
    pub fn begin_retry(&mut self, message_id: &str) -> Option<String> {
        let index = self.position(message_id)?;
        if self.entries[index].delivery != Delivery::Failed {
            return None;
        }
        self.entries[index].delivery = Delivery::Pending;
        Some(self.entries[index].message.message.clone())
    }

    /// Append a local-only confirmed entry (the greeting shown in an empty
    /// session). Never persisted, never part of model history.
    pub fn seed(&mut self, message: Message) {
        self.entries.push(LogEntry::confirmed(message));
    }

    /// Drop all local state and the session binding.
    pub fn reset(&mut self) {
        self.session_id = None;
        self.entries.clear();
        self.cursor = None;
        self.fetch.reset();
    }

    fn contains(&self, message_id: &str) -> bool {
        self.position(message_id).is_some()
    }

    fn position(&self, message_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.message.message_id == message_id)
    }
}
