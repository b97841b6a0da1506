//! Pending-change log entries
//!
//! Every mutation that cannot be committed remotely is recorded as a
//! [`PendingChange`]. The log is append-only and ordered: entries are
//! replayed strictly in creation order and an entry is only removed after
//! the corresponding remote call has been acknowledged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::{Calendar, Event};
use super::newtypes::{CalendarId, ChangeId, EventId};

/// The five mutation kinds the engine can defer, each with its own payload
///
/// Dispatched via exhaustive pattern matching in the drain loop; there is
/// no stringly-typed dispatch anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    /// Create a calendar that does not yet exist remotely
    CreateCalendar {
        /// The optimistic local record (no server id yet)
        calendar: Calendar,
    },
    /// Update a calendar the server already knows
    UpdateCalendar {
        /// The full replacement record
        calendar: Calendar,
    },
    /// Create an event that does not yet exist remotely
    CreateEvent {
        /// The parent calendar
        calendar_id: CalendarId,
        /// The optimistic local record (no server id yet)
        event: Event,
    },
    /// Update an event the server already knows
    UpdateEvent {
        /// The parent calendar
        calendar_id: CalendarId,
        /// The full replacement record
        event: Event,
    },
    /// Delete an event
    DeleteEvent {
        /// The parent calendar
        calendar_id: CalendarId,
        /// The event to remove
        event_id: EventId,
    },
}

impl ChangeKind {
    /// Short name of the mutation kind, matching its wire tag
    pub fn name(&self) -> &'static str {
        match self {
            ChangeKind::CreateCalendar { .. } => "create_calendar",
            ChangeKind::UpdateCalendar { .. } => "update_calendar",
            ChangeKind::CreateEvent { .. } => "create_event",
            ChangeKind::UpdateEvent { .. } => "update_event",
            ChangeKind::DeleteEvent { .. } => "delete_event",
        }
    }
}

/// One entry of the pending-change log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    /// Strictly increasing identifier assigned by the log on append
    pub id: ChangeId,
    /// The deferred mutation and its payload
    pub kind: ChangeKind,
    /// When the entry was appended
    pub queued_at: DateTime<Utc>,
}
