//! Pending-change log port (driven/secondary port)
//!
//! The append-only, ordered record of mutations that could not be
//! committed remotely. Owned exclusively by the sync orchestrator; no
//! other component may mutate it.
//!
//! ## Invariants
//!
//! - Identifiers are strictly increasing and unique for the lifetime of
//!   the local store, even across clears.
//! - The log is never reordered; `list_all` returns insertion order.
//! - No entry is removed before its remote call has been acknowledged.

use crate::domain::newtypes::ChangeId;
use crate::domain::pending::{ChangeKind, PendingChange};

/// Port trait for the durable pending-change log
#[async_trait::async_trait]
pub trait IChangeLog: Send + Sync {
    /// Appends a mutation, assigning it the next identifier and a timestamp
    ///
    /// The entry is durably stored before this returns.
    async fn append(&self, kind: ChangeKind) -> anyhow::Result<PendingChange>;

    /// Returns all entries in insertion order
    async fn list_all(&self) -> anyhow::Result<Vec<PendingChange>>;

    /// Number of entries currently queued
    async fn count(&self) -> anyhow::Result<u64>;

    /// Removes every entry
    ///
    /// Only valid after a fully successful drain of the whole log.
    async fn clear(&self) -> anyhow::Result<()>;

    /// Removes entries with identifiers up to and including `last`
    ///
    /// Used by the drain loop to clear exactly the snapshot it replayed:
    /// entries appended while the drain was running stay queued for the
    /// next cycle.
    async fn clear_through(&self, last: ChangeId) -> anyhow::Result<()>;
}
