//! SQLite implementation of IChangeLog
//!
//! The pending-change log rides on a single `pending_changes` table whose
//! `INTEGER PRIMARY KEY AUTOINCREMENT` column provides the strictly
//! increasing, never-reused identifier the port contract requires. The
//! mutation payload is stored as the serde-tagged JSON of [`ChangeKind`],
//! so the on-disk form carries the same `type` discriminator as the wire
//! form.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use agrisync_core::domain::newtypes::ChangeId;
use agrisync_core::domain::pending::{ChangeKind, PendingChange};
use agrisync_core::ports::IChangeLog;

use crate::StoreError;

/// SQLite-based implementation of the pending-change log port
pub struct SqliteChangeLog {
    pool: SqlitePool,
}

impl SqliteChangeLog {
    /// Creates a new change log instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<PendingChange, StoreError> {
    let id: i64 = row.get("id");
    let change: String = row.get("change");
    let queued_at: String = row.get("queued_at");

    let kind: ChangeKind = serde_json::from_str(&change).map_err(|e| {
        StoreError::SerializationError(format!("Failed to reconstruct ChangeKind from row: {}", e))
    })?;

    let queued_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&queued_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StoreError::SerializationError(format!(
                "Failed to parse queued_at '{}': {}",
                queued_at, e
            ))
        })?;

    Ok(PendingChange {
        id: ChangeId::new(id),
        kind,
        queued_at,
    })
}

#[async_trait::async_trait]
impl IChangeLog for SqliteChangeLog {
    async fn append(&self, kind: ChangeKind) -> anyhow::Result<PendingChange> {
        let change = serde_json::to_string(&kind)
            .map_err(|e| anyhow::anyhow!("Failed to serialize change: {}", e))?;
        let queued_at = Utc::now();

        let result = sqlx::query("INSERT INTO pending_changes (change, queued_at) VALUES (?, ?)")
            .bind(&change)
            .bind(queued_at.to_rfc3339())
            .execute(&self.pool)
            .await?;

        let id = ChangeId::new(result.last_insert_rowid());

        tracing::debug!(change_id = %id, kind = kind.name(), "Appended pending change");

        Ok(PendingChange {
            id,
            kind,
            queued_at,
        })
    }

    async fn list_all(&self) -> anyhow::Result<Vec<PendingChange>> {
        let rows = sqlx::query("SELECT id, change, queued_at FROM pending_changes ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push(entry_from_row(row)?);
        }

        Ok(entries)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_changes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn clear(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM pending_changes")
            .execute(&self.pool)
            .await?;

        tracing::debug!("Cleared pending-change log");
        Ok(())
    }

    async fn clear_through(&self, last: ChangeId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM pending_changes WHERE id <= ?")
            .bind(last.value())
            .execute(&self.pool)
            .await?;

        tracing::debug!(through = %last, "Cleared drained pending changes");
        Ok(())
    }
}
