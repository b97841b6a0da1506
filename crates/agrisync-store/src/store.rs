//! SQLite implementation of ILocalStore
//!
//! This module provides the concrete SQLite-based implementation of the
//! local store port defined in agrisync-core.
//!
//! ## Type Mapping
//!
//! | Domain Type      | SQL Type | Strategy                                  |
//! |------------------|----------|-------------------------------------------|
//! | Calendar, Event  | TEXT     | serde_json payload column (whole record)  |
//! | CalendarId, etc. | TEXT     | String via `.as_str()`                    |
//! | NaiveDate        | TEXT     | ISO 8601 date via `.to_string()`          |
//! | DateTime<Utc>    | TEXT     | RFC 3339 via `to_rfc3339()`               |
//!
//! Scalar columns (`owner_id`, `calendar_id`, `date`) are duplicated out of
//! the payload purely to back the owner and (calendar, date) indexes; the
//! payload column is the record of truth for reads.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use agrisync_core::domain::calendar::{Calendar, Event};
use agrisync_core::domain::newtypes::{CalendarId, OwnerId};
use agrisync_core::ports::ILocalStore;

use crate::StoreError;

/// Metadata key under which the last successful drain timestamp is stored
const META_LAST_SYNC: &str = "last_sync";

/// SQLite-based implementation of the local store port
///
/// Provides persistent, restart-surviving storage for the cached Calendar
/// and Event collections. All operations go through a connection pool for
/// concurrency.
pub struct SqliteLocalStore {
    pool: SqlitePool,
}

impl SqliteLocalStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Row mapping helpers
// ============================================================================

fn calendar_from_row(row: &SqliteRow) -> Result<Calendar, StoreError> {
    let payload: String = row.get("payload");
    serde_json::from_str(&payload).map_err(|e| {
        StoreError::SerializationError(format!("Failed to reconstruct Calendar from row: {}", e))
    })
}

fn event_from_row(row: &SqliteRow) -> Result<Event, StoreError> {
    let payload: String = row.get("payload");
    serde_json::from_str(&payload).map_err(|e| {
        StoreError::SerializationError(format!("Failed to reconstruct Event from row: {}", e))
    })
}

/// Parse a DateTime<Utc> from an RFC 3339 string
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StoreError::SerializationError(format!("Failed to parse datetime '{}': {}", s, e))
        })
}

// ============================================================================
// ILocalStore implementation
// ============================================================================

#[async_trait::async_trait]
impl ILocalStore for SqliteLocalStore {
    // --- Calendar collection ---

    async fn put_calendar(&self, calendar: &Calendar) -> anyhow::Result<()> {
        let key = calendar.storage_key();
        let remote_id = calendar.id.as_ref().map(|i| i.as_str().to_string());
        let owner_id = calendar.owner.as_str().to_string();
        let payload = serde_json::to_string(calendar)
            .map_err(|e| anyhow::anyhow!("Failed to serialize calendar: {}", e))?;

        sqlx::query(
            "INSERT OR REPLACE INTO calendars \
             (key, remote_id, owner_id, crop, planting_date, harvest_date, payload) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&key)
        .bind(&remote_id)
        .bind(&owner_id)
        .bind(&calendar.crop)
        .bind(calendar.planting_date.to_string())
        .bind(calendar.harvest_date.to_string())
        .bind(&payload)
        .execute(&self.pool)
        .await?;

        tracing::trace!(calendar = %key, "Saved calendar");
        Ok(())
    }

    async fn get_calendar(&self, key: &str) -> anyhow::Result<Option<Calendar>> {
        let row = sqlx::query("SELECT payload FROM calendars WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(calendar_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn calendars(&self) -> anyhow::Result<Vec<Calendar>> {
        let rows = sqlx::query("SELECT payload FROM calendars")
            .fetch_all(&self.pool)
            .await?;

        let mut calendars = Vec::with_capacity(rows.len());
        for row in &rows {
            calendars.push(calendar_from_row(row)?);
        }

        Ok(calendars)
    }

    async fn calendars_for_owner(&self, owner: &OwnerId) -> anyhow::Result<Vec<Calendar>> {
        let rows = sqlx::query("SELECT payload FROM calendars WHERE owner_id = ?")
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut calendars = Vec::with_capacity(rows.len());
        for row in &rows {
            calendars.push(calendar_from_row(row)?);
        }

        Ok(calendars)
    }

    async fn delete_calendar(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM calendars WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        tracing::trace!(calendar = %key, "Deleted calendar");
        Ok(())
    }

    async fn replace_calendars(&self, calendars: &[Calendar]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM calendars").execute(&mut *tx).await?;

        for calendar in calendars {
            let key = calendar.storage_key();
            let remote_id = calendar.id.as_ref().map(|i| i.as_str().to_string());
            let payload = serde_json::to_string(calendar)
                .map_err(|e| anyhow::anyhow!("Failed to serialize calendar: {}", e))?;

            sqlx::query(
                "INSERT OR REPLACE INTO calendars \
                 (key, remote_id, owner_id, crop, planting_date, harvest_date, payload) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&key)
            .bind(&remote_id)
            .bind(calendar.owner.as_str())
            .bind(&calendar.crop)
            .bind(calendar.planting_date.to_string())
            .bind(calendar.harvest_date.to_string())
            .bind(&payload)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(count = calendars.len(), "Replaced calendar collection");
        Ok(())
    }

    // --- Event collection ---

    async fn put_event(&self, event: &Event) -> anyhow::Result<()> {
        let key = event.storage_key();
        let remote_id = event.id.as_ref().map(|i| i.as_str().to_string());
        let payload = serde_json::to_string(event)
            .map_err(|e| anyhow::anyhow!("Failed to serialize event: {}", e))?;

        sqlx::query(
            "INSERT OR REPLACE INTO events \
             (key, remote_id, calendar_id, kind, date, payload) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&key)
        .bind(&remote_id)
        .bind(event.calendar_id.as_str())
        .bind(&event.kind)
        .bind(event.date.to_string())
        .bind(&payload)
        .execute(&self.pool)
        .await?;

        tracing::trace!(event = %key, "Saved event");
        Ok(())
    }

    async fn get_event(&self, key: &str) -> anyhow::Result<Option<Event>> {
        let row = sqlx::query("SELECT payload FROM events WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(event_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn events_for(&self, calendar_id: &CalendarId) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query("SELECT payload FROM events WHERE calendar_id = ?")
            .bind(calendar_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            events.push(event_from_row(row)?);
        }

        Ok(events)
    }

    async fn events_on(
        &self,
        calendar_id: &CalendarId,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query("SELECT payload FROM events WHERE calendar_id = ? AND date = ?")
            .bind(calendar_id.as_str())
            .bind(date.to_string())
            .fetch_all(&self.pool)
            .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            events.push(event_from_row(row)?);
        }

        Ok(events)
    }

    async fn delete_event(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM events WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        tracing::trace!(event = %key, "Deleted event");
        Ok(())
    }

    // --- Sync bookkeeping ---

    async fn last_sync(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM sync_meta WHERE key = ?")
                .bind(META_LAST_SYNC)
                .fetch_optional(&self.pool)
                .await?;

        match value {
            Some(ref s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
            _ => Ok(None),
        }
    }

    async fn record_sync(&self, at: DateTime<Utc>) -> anyhow::Result<()> {
        sqlx::query("INSERT OR REPLACE INTO sync_meta (key, value) VALUES (?, ?)")
            .bind(META_LAST_SYNC)
            .bind(at.to_rfc3339())
            .execute(&self.pool)
            .await?;

        tracing::trace!(at = %at, "Recorded sync timestamp");
        Ok(())
    }
}
