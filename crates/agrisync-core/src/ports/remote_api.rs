//! Remote API port (driven/secondary port)
//!
//! This module defines the interface for the calendar REST service. The
//! primary implementation targets the hosted JSON-over-HTTPS API, but the
//! trait is deliberately thin so tests can substitute scripted doubles.
//!
//! ## Design Notes
//!
//! - Unlike the storage ports, this port returns a typed [`RemoteError`]
//!   rather than `anyhow::Error`: the orchestrator's entire queueing policy
//!   hinges on distinguishing a network failure (retry via the queue) from
//!   a definitive server rejection (surface to the caller, never queue).
//! - The adapter performs no retries. Retry policy belongs to the
//!   orchestrator, which replays through the pending-change log.
//! - Every success returns the server's canonical record, which callers
//!   must treat as authoritative and write to the local store whole.

use thiserror::Error;

use crate::domain::calendar::{Calendar, Event};
use crate::domain::newtypes::{CalendarId, EventId};

/// Failure outcome of a remote call, normalized by the adapter
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No definitive response reached the server (DNS, connect, timeout,
    /// aborted body, 5xx, throttling). Always safe to retry via the queue.
    #[error("network failure: {0}")]
    Network(String),

    /// The server responded with a definitive rejection (validation error,
    /// missing resource, auth failure). Retrying the same payload is futile.
    #[error("server rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP status code of the rejection
        status: u16,
        /// Server-provided reason, if any
        message: String,
    },
}

impl RemoteError {
    /// Returns true if the failure is retryable through the pending queue
    pub fn is_network(&self) -> bool {
        matches!(self, RemoteError::Network(_))
    }
}

/// Port trait for the remote calendar service
///
/// One function per mutation type, plus the authoritative list fetch.
/// Implementations handle HTTP specifics, authentication headers, and
/// error normalization into [`RemoteError`].
#[async_trait::async_trait]
pub trait IRemoteApi: Send + Sync {
    /// Creates a calendar (`POST /calendars`)
    ///
    /// # Returns
    /// The canonical stored record, with a server-assigned identifier.
    async fn create_calendar(&self, calendar: &Calendar) -> Result<Calendar, RemoteError>;

    /// Updates a calendar (`PUT /calendars/{id}`)
    ///
    /// The payload must carry a server identifier.
    async fn update_calendar(&self, calendar: &Calendar) -> Result<Calendar, RemoteError>;

    /// Lists all calendars for the authenticated owner (`GET /calendars`)
    ///
    /// The result is authoritative: callers refresh the local store
    /// wholesale from it.
    async fn list_calendars(&self) -> Result<Vec<Calendar>, RemoteError>;

    /// Creates an event (`POST /calendars/{id}/events`)
    async fn create_event(
        &self,
        calendar_id: &CalendarId,
        event: &Event,
    ) -> Result<Event, RemoteError>;

    /// Updates an event (`PUT /calendars/{id}/events/{eventId}`)
    async fn update_event(
        &self,
        calendar_id: &CalendarId,
        event: &Event,
    ) -> Result<Event, RemoteError>;

    /// Deletes an event (`DELETE /calendars/{id}/events/{eventId}`)
    ///
    /// Deleting an event the server no longer has is a success, not an
    /// error — deletion is idempotent end to end.
    async fn delete_event(
        &self,
        calendar_id: &CalendarId,
        event_id: &EventId,
    ) -> Result<(), RemoteError>;
}
