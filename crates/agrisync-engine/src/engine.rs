//! Sync orchestrator
//!
//! The [`SyncEngine`] decides, per mutation request, whether to attempt the
//! remote call live or to queue it, and drains the pending-change log in
//! order once connectivity returns.
//!
//! ## State Machine
//!
//! ```text
//!                 request              online   ┌────────────────┐
//!     caller ────────────────► Idle ──────────► │ AttemptingLive │
//!                               │               └───────┬────────┘
//!                               │ offline          fail │ success
//!                               ▼                       │     │
//!                      ┌────────────────┐ ◄─────────────┘     ▼
//!                      │ QueuingOffline │               canonical record
//!                      └────────────────┘               to local store
//!
//!     online trigger ──► Idle ──► Draining ──► Idle   (single-flight)
//! ```
//!
//! ## Drain Policy
//!
//! Entries replay strictly in creation order. The first failure halts the
//! drain and leaves the failed entry and everything after it queued:
//! later entries may depend on earlier ones (an update referencing an
//! entity whose creation is still queued), so skipping ahead risks
//! referencing a remote identifier that does not yet exist. Only a fully
//! successful pass clears the drained snapshot; entries appended while the
//! drain was running stay queued for the next cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use agrisync_core::domain::calendar::{Calendar, Event};
use agrisync_core::domain::newtypes::{CalendarId, EventId};
use agrisync_core::domain::pending::{ChangeKind, PendingChange};
use agrisync_core::ports::{IChangeLog, ILocalStore, IRemoteApi, RemoteError};

use crate::connectivity::ConnectivityMonitor;

// ============================================================================
// Caller-facing result types
// ============================================================================

/// Errors surfaced to callers of the engine
///
/// A network failure during a live attempt is *not* an error: the caller
/// receives a queued [`SaveOutcome`] instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The server definitively rejected the payload; it was not queued
    #[error("server rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP status code of the rejection
        status: u16,
        /// Server-provided reason, if any
        message: String,
    },

    /// The local persistent store is unavailable; there is no further fallback
    #[error("local store failure: {0}")]
    Store(#[source] anyhow::Error),
}

/// Result of a save request: the stored record and how it got there
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome<T> {
    /// The record now held by the local store (canonical if the live
    /// attempt succeeded, optimistic if queued)
    pub record: T,
    /// True if the mutation was deferred to the pending-change log
    pub queued: bool,
}

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// True if the remote deletion was deferred to the pending-change log
    pub queued: bool,
}

/// Snapshot of the engine's offline bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineStatus {
    /// Current connectivity signal
    pub is_online: bool,
    /// Entries waiting in the pending-change log
    pub pending_changes: u64,
    /// Completion time of the last fully successful drain
    pub last_sync: Option<DateTime<Utc>>,
}

/// Result of a drain cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every queued entry was acknowledged remotely; the log was cleared
    Completed {
        /// Number of entries replayed
        processed: u64,
    },
    /// An entry failed; it and everything after it stay queued
    Stopped {
        /// Entries acknowledged before the failure
        processed: u64,
        /// Entries left in the log from this snapshot
        remaining: u64,
    },
    /// Another drain cycle was already running; this trigger was ignored
    AlreadyDraining,
}

// ============================================================================
// Drain single-flight guard
// ============================================================================

/// Resets the `Draining` flag when the cycle ends, however it ends
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Offline-first synchronization orchestrator
///
/// One engine instance exists per application lifetime, constructed at
/// startup and passed by reference to callers. It is the sole writer of
/// the pending-change log.
///
/// ## Dependencies
///
/// - `remote`: the calendar service adapter (IRemoteApi)
/// - `store`: persistent local cache (ILocalStore)
/// - `log`: durable pending-change log (IChangeLog)
/// - `monitor`: the connectivity signal
pub struct SyncEngine {
    /// Remote calendar service
    remote: Arc<dyn IRemoteApi>,
    /// Persistent local cache of Calendars and Events
    store: Arc<dyn ILocalStore>,
    /// Append-only pending-change log; owned exclusively by this engine
    log: Arc<dyn IChangeLog>,
    /// Connectivity signal consulted per request
    monitor: Arc<ConnectivityMonitor>,
    /// True while a drain cycle is running (single-flight)
    draining: AtomicBool,
}

impl SyncEngine {
    /// Creates a new `SyncEngine` with the given dependencies
    pub fn new(
        remote: Arc<dyn IRemoteApi>,
        store: Arc<dyn ILocalStore>,
        log: Arc<dyn IChangeLog>,
        monitor: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self {
            remote,
            store,
            log,
            monitor,
            draining: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Mutation requests (live-attempt-or-queue)
    // ========================================================================

    /// Saves a calendar: live against the server when possible, queued
    /// otherwise
    ///
    /// A record without a server identifier is created; one with an
    /// identifier is updated. On a live success the server's canonical
    /// record is cached and returned. On a network failure (or while
    /// offline) the optimistic record is cached, a pending change is
    /// appended, and the caller receives a queued success.
    ///
    /// # Errors
    ///
    /// [`SyncError::Rejected`] if the server definitively rejected the
    /// payload (nothing is queued), [`SyncError::Store`] if the local
    /// store itself failed.
    #[tracing::instrument(skip(self, calendar), fields(crop = %calendar.crop))]
    pub async fn save_calendar(
        &self,
        calendar: Calendar,
    ) -> Result<SaveOutcome<Calendar>, SyncError> {
        if self.monitor.is_online() {
            let attempt = if calendar.id.is_some() {
                self.remote.update_calendar(&calendar).await
            } else {
                self.remote.create_calendar(&calendar).await
            };

            match attempt {
                Ok(canonical) => {
                    // First creation moves the record from its client-ref
                    // key to the server-id key
                    if canonical.storage_key() != calendar.storage_key() {
                        self.store
                            .delete_calendar(&calendar.storage_key())
                            .await
                            .map_err(SyncError::Store)?;
                    }
                    self.store
                        .put_calendar(&canonical)
                        .await
                        .map_err(SyncError::Store)?;

                    debug!(calendar = %canonical.storage_key(), "Calendar saved live");
                    return Ok(SaveOutcome {
                        record: canonical,
                        queued: false,
                    });
                }
                Err(RemoteError::Rejected { status, message }) => {
                    return Err(SyncError::Rejected { status, message });
                }
                Err(RemoteError::Network(reason)) => {
                    debug!(%reason, "Live calendar save failed, queueing");
                }
            }
        }

        self.store
            .put_calendar(&calendar)
            .await
            .map_err(SyncError::Store)?;

        let kind = if calendar.id.is_some() {
            ChangeKind::UpdateCalendar {
                calendar: calendar.clone(),
            }
        } else {
            ChangeKind::CreateCalendar {
                calendar: calendar.clone(),
            }
        };
        self.queue(kind).await?;

        Ok(SaveOutcome {
            record: calendar,
            queued: true,
        })
    }

    /// Saves an event under the given calendar: live when possible, queued
    /// otherwise
    ///
    /// Same policy as [`save_calendar`](SyncEngine::save_calendar).
    #[tracing::instrument(skip(self, event), fields(calendar = %calendar_id, kind = %event.kind))]
    pub async fn save_event(
        &self,
        calendar_id: CalendarId,
        mut event: Event,
    ) -> Result<SaveOutcome<Event>, SyncError> {
        event.calendar_id = calendar_id.clone();

        if self.monitor.is_online() {
            let attempt = if event.id.is_some() {
                self.remote.update_event(&calendar_id, &event).await
            } else {
                self.remote.create_event(&calendar_id, &event).await
            };

            match attempt {
                Ok(canonical) => {
                    if canonical.storage_key() != event.storage_key() {
                        self.store
                            .delete_event(&event.storage_key())
                            .await
                            .map_err(SyncError::Store)?;
                    }
                    self.store
                        .put_event(&canonical)
                        .await
                        .map_err(SyncError::Store)?;

                    debug!(event = %canonical.storage_key(), "Event saved live");
                    return Ok(SaveOutcome {
                        record: canonical,
                        queued: false,
                    });
                }
                Err(RemoteError::Rejected { status, message }) => {
                    return Err(SyncError::Rejected { status, message });
                }
                Err(RemoteError::Network(reason)) => {
                    debug!(%reason, "Live event save failed, queueing");
                }
            }
        }

        self.store
            .put_event(&event)
            .await
            .map_err(SyncError::Store)?;

        let kind = if event.id.is_some() {
            ChangeKind::UpdateEvent {
                calendar_id,
                event: event.clone(),
            }
        } else {
            ChangeKind::CreateEvent {
                calendar_id,
                event: event.clone(),
            }
        };
        self.queue(kind).await?;

        Ok(SaveOutcome {
            record: event,
            queued: true,
        })
    }

    /// Deletes an event
    ///
    /// The local copy is removed immediately regardless of network state.
    /// The remote deletion is attempted live when online and queued
    /// otherwise. Deleting an already-absent event is a no-op everywhere.
    #[tracing::instrument(skip(self), fields(calendar = %calendar_id, event = %event_id))]
    pub async fn delete_event(
        &self,
        calendar_id: CalendarId,
        event_id: EventId,
    ) -> Result<DeleteOutcome, SyncError> {
        self.store
            .delete_event(event_id.as_str())
            .await
            .map_err(SyncError::Store)?;

        if self.monitor.is_online() {
            match self.remote.delete_event(&calendar_id, &event_id).await {
                Ok(()) => {
                    debug!("Event deleted live");
                    return Ok(DeleteOutcome { queued: false });
                }
                Err(RemoteError::Rejected { status, message }) => {
                    return Err(SyncError::Rejected { status, message });
                }
                Err(RemoteError::Network(reason)) => {
                    debug!(%reason, "Live event delete failed, queueing");
                }
            }
        }

        let change = self
            .log
            .append(ChangeKind::DeleteEvent {
                calendar_id,
                event_id,
            })
            .await
            .map_err(SyncError::Store)?;

        info!(change_id = %change.id, "Event deletion queued");
        Ok(DeleteOutcome { queued: true })
    }

    /// Appends a pending change for a mutation that could not commit live
    async fn queue(&self, kind: ChangeKind) -> Result<(), SyncError> {
        let change = self.log.append(kind).await.map_err(SyncError::Store)?;
        info!(
            change_id = %change.id,
            kind = change.kind.name(),
            "Mutation queued for replay"
        );
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Returns the calendar list
    ///
    /// While online, fetches the authoritative remote list and refreshes
    /// the local cache wholesale before returning it. A network failure
    /// (or being offline) falls back to the cached collection.
    ///
    /// # Errors
    ///
    /// [`SyncError::Rejected`] if the server rejected the fetch,
    /// [`SyncError::Store`] if the cache is unavailable.
    #[tracing::instrument(skip(self))]
    pub async fn get_calendars(&self) -> Result<Vec<Calendar>, SyncError> {
        if self.monitor.is_online() {
            match self.remote.list_calendars().await {
                Ok(calendars) => {
                    self.store
                        .replace_calendars(&calendars)
                        .await
                        .map_err(SyncError::Store)?;
                    debug!(count = calendars.len(), "Calendar cache refreshed from remote");
                    return Ok(calendars);
                }
                Err(RemoteError::Rejected { status, message }) => {
                    return Err(SyncError::Rejected { status, message });
                }
                Err(RemoteError::Network(reason)) => {
                    debug!(%reason, "Calendar list fetch failed, serving cache");
                }
            }
        }

        self.store.calendars().await.map_err(SyncError::Store)
    }

    /// Returns the engine's offline bookkeeping
    pub async fn offline_status(&self) -> Result<OfflineStatus, SyncError> {
        let pending_changes = self.log.count().await.map_err(SyncError::Store)?;
        let last_sync = self.store.last_sync().await.map_err(SyncError::Store)?;

        Ok(OfflineStatus {
            is_online: self.monitor.is_online(),
            pending_changes,
            last_sync,
        })
    }

    /// Manual retry entry point: runs a drain cycle now
    pub async fn force_sync(&self) -> Result<DrainOutcome, SyncError> {
        info!("Manual sync requested");
        self.drain().await
    }

    // ========================================================================
    // Drain
    // ========================================================================

    /// Replays the pending-change log against the remote service, in order
    ///
    /// Single-flight: if a drain is already running the trigger is
    /// ignored. The cycle works from a snapshot of the log taken at entry;
    /// mutations queued while it runs are picked up next cycle.
    #[tracing::instrument(skip(self))]
    pub async fn drain(&self) -> Result<DrainOutcome, SyncError> {
        if self.draining.swap(true, Ordering::AcqRel) {
            debug!("Drain already in progress, ignoring trigger");
            return Ok(DrainOutcome::AlreadyDraining);
        }
        let _guard = DrainGuard(&self.draining);

        let entries = self.log.list_all().await.map_err(SyncError::Store)?;
        let last_id = match entries.last() {
            Some(entry) => entry.id,
            None => {
                debug!("Pending log empty, nothing to drain");
                return Ok(DrainOutcome::Completed { processed: 0 });
            }
        };

        info!(entries = entries.len(), "Draining pending changes");

        let mut processed: u64 = 0;
        for entry in &entries {
            match self.apply(entry).await {
                Ok(()) => {
                    debug!(change_id = %entry.id, kind = entry.kind.name(), "Entry acknowledged");
                    processed += 1;
                }
                Err(err) => {
                    // FIFO is preserved: the failed entry and everything
                    // after it stay queued for the next cycle.
                    warn!(
                        change_id = %entry.id,
                        kind = entry.kind.name(),
                        %err,
                        "Drain halted"
                    );
                    return Ok(DrainOutcome::Stopped {
                        processed,
                        remaining: entries.len() as u64 - processed,
                    });
                }
            }
        }

        self.log
            .clear_through(last_id)
            .await
            .map_err(SyncError::Store)?;

        if let Err(err) = self.store.record_sync(Utc::now()).await {
            warn!(%err, "Failed to record drain timestamp");
        }

        info!(processed, "Drain completed, pending log cleared");
        Ok(DrainOutcome::Completed { processed })
    }

    /// Replays a single entry and writes the canonical result back
    ///
    /// Local writeback failures after a remote acknowledgment are logged
    /// and swallowed: the entry is durably applied remotely and must not
    /// be replayed, and the cache self-repairs on the next full refresh.
    async fn apply(&self, entry: &PendingChange) -> Result<(), RemoteError> {
        match &entry.kind {
            ChangeKind::CreateCalendar { calendar } => {
                let canonical = self.remote.create_calendar(calendar).await?;
                self.writeback(
                    self.store.delete_calendar(&calendar.storage_key()).await,
                    "drop optimistic calendar",
                );
                self.writeback(
                    self.store.put_calendar(&canonical).await,
                    "cache created calendar",
                );
            }
            ChangeKind::UpdateCalendar { calendar } => {
                let canonical = self.remote.update_calendar(calendar).await?;
                self.writeback(
                    self.store.put_calendar(&canonical).await,
                    "cache updated calendar",
                );
            }
            ChangeKind::CreateEvent { calendar_id, event } => {
                let canonical = self.remote.create_event(calendar_id, event).await?;
                self.writeback(
                    self.store.delete_event(&event.storage_key()).await,
                    "drop optimistic event",
                );
                self.writeback(self.store.put_event(&canonical).await, "cache created event");
            }
            ChangeKind::UpdateEvent { calendar_id, event } => {
                let canonical = self.remote.update_event(calendar_id, event).await?;
                self.writeback(self.store.put_event(&canonical).await, "cache updated event");
            }
            ChangeKind::DeleteEvent {
                calendar_id,
                event_id,
            } => {
                self.remote.delete_event(calendar_id, event_id).await?;
                // Local copy went away when the delete was requested;
                // repeating the removal is a no-op.
                self.writeback(
                    self.store.delete_event(event_id.as_str()).await,
                    "drop deleted event",
                );
            }
        }

        Ok(())
    }

    fn writeback(&self, result: anyhow::Result<()>, what: &str) {
        if let Err(err) = result {
            warn!(%err, what, "Local writeback failed after remote acknowledgment");
        }
    }
}
