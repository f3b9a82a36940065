//! Device audit records.
//!
//! Devices are a write-only audit log: the core never reads them back.

use sqlx::SqlitePool;

use crate::Result;

/// Record a device identifier the first time it is seen.
///
/// Re-recording an existing device is a no-op, so callers can invoke this
/// unconditionally during identity resolution.
pub async fn record_device(pool: &SqlitePool, device_id: &str, user_agent: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO devices (device_id, user_agent)
        VALUES (?, ?)
        ON CONFLICT(device_id) DO NOTHING
        "#,
    )
    .bind(device_id)
    .bind(user_agent)
    .execute(pool)
    .await?;

    Ok(())
}
