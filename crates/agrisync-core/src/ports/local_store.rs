//! Local store port (driven/secondary port)
//!
//! This module defines the interface for the persistent local cache of
//! Calendars and Events that the client keeps working against while
//! disconnected.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, filesystem, etc.) and don't need domain-level classification.
//!   A store failure is fatal for the operation that hit it; there is no
//!   further fallback below this layer.
//! - Every write overwrites the prior value for that key in full. There is
//!   no partial-update semantics: whoever calls `put_*` supplies the
//!   complete merged record.
//! - Records are keyed by [`Calendar::storage_key`] / [`Event::storage_key`]
//!   (the server identifier once known, otherwise the client reference).
//!
//! [`Calendar::storage_key`]: crate::domain::Calendar::storage_key
//! [`Event::storage_key`]: crate::domain::Event::storage_key

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::calendar::{Calendar, Event};
use crate::domain::newtypes::{CalendarId, OwnerId};

/// Port trait for the persistent local cache
///
/// Implementations must survive process restarts and support concurrent
/// readers and writers (last write wins, consistent with the
/// overwrite-only contract).
#[async_trait::async_trait]
pub trait ILocalStore: Send + Sync {
    // --- Calendar collection ---

    /// Upserts a calendar by its storage key; idempotent
    async fn put_calendar(&self, calendar: &Calendar) -> anyhow::Result<()>;

    /// Retrieves a calendar by its storage key
    async fn get_calendar(&self, key: &str) -> anyhow::Result<Option<Calendar>>;

    /// Returns every cached calendar, in no guaranteed order
    async fn calendars(&self) -> anyhow::Result<Vec<Calendar>>;

    /// Returns cached calendars for one owner, using the owner index
    async fn calendars_for_owner(&self, owner: &OwnerId) -> anyhow::Result<Vec<Calendar>>;

    /// Removes a calendar; idempotent (removing an absent key is a no-op)
    async fn delete_calendar(&self, key: &str) -> anyhow::Result<()>;

    /// Replaces the entire calendar collection with an authoritative list
    ///
    /// Used after a successful full remote fetch. Atomic: either the old
    /// cache or the new list is visible, never a mix.
    async fn replace_calendars(&self, calendars: &[Calendar]) -> anyhow::Result<()>;

    // --- Event collection ---

    /// Upserts an event by its storage key; idempotent
    async fn put_event(&self, event: &Event) -> anyhow::Result<()>;

    /// Retrieves an event by its storage key
    async fn get_event(&self, key: &str) -> anyhow::Result<Option<Event>>;

    /// Returns cached events for one calendar, using the calendar index
    async fn events_for(&self, calendar_id: &CalendarId) -> anyhow::Result<Vec<Event>>;

    /// Returns cached events for one calendar on one day
    async fn events_on(
        &self,
        calendar_id: &CalendarId,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Event>>;

    /// Removes an event; idempotent (removing an absent key is a no-op)
    async fn delete_event(&self, key: &str) -> anyhow::Result<()>;

    // --- Sync bookkeeping ---

    /// When the last fully successful drain completed, if ever
    async fn last_sync(&self) -> anyhow::Result<Option<DateTime<Utc>>>;

    /// Records the completion time of a fully successful drain
    async fn record_sync(&self, at: DateTime<Utc>) -> anyhow::Result<()>;
}
