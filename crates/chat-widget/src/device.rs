//! Persistent device identity.
//!
//! Every widget instance is keyed by a device id that survives restarts: a
//! UUID stored in a plain text file. All sessions and messages the widget
//! creates are scoped to this id.

use std::fs;
use std::path::Path;

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// A stable per-installation identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    id: String,
}

impl DeviceIdentity {
    /// Load the identity from `path`, minting and persisting a fresh UUID if
    /// the file is missing or empty.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Ok(content) = fs::read_to_string(path) {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return Ok(Self {
                    id: trimmed.to_string(),
                });
            }
        }

        let id = Uuid::new_v4().to_string();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &id)?;
        debug!(device_id = %id, "Minted new device identity");

        Ok(Self { id })
    }

    /// Wrap an already-known id (tests, embedded hosts).
    pub fn from_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record this device in the audit table. Idempotent.
    pub async fn register(&self, pool: &SqlitePool, user_agent: &str) -> Result<()> {
        database::device::record_device(pool, &self.id, user_agent).await?;
        Ok(())
    }
}
