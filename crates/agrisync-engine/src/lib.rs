//! Agrisync Engine - Offline-first synchronization orchestrator
//!
//! The engine lets a client keep working against the local store while
//! disconnected, queues every mutation it cannot immediately commit, and
//! reconciles the queue against the remote service once connectivity
//! returns.
//!
//! ## Components
//!
//! - [`ConnectivityMonitor`] - binary online/offline signal with
//!   deduplicated transition triggers and a focus-regain hook
//! - [`SyncEngine`] - the orchestrator state machine: live-attempt-or-queue
//!   per mutation, single-flight in-order drain of the pending log
//! - [`SyncRunner`] - background loop turning connectivity triggers into
//!   drain cycles
//!
//! ## Control Flow
//!
//! ```text
//! caller ──► SyncEngine ──► ConnectivityMonitor (online?)
//!                │
//!      online ───┤── offline/failed ──► ILocalStore + IChangeLog (queued)
//!                ▼
//!           IRemoteApi ── success ──► ILocalStore (canonical record)
//!
//! monitor trigger ──► SyncRunner ──► SyncEngine::drain (single-flight)
//! ```

pub mod connectivity;
pub mod engine;
pub mod runner;

pub use connectivity::{ConnectivityMonitor, ConnectivityState, IConnectivityProbe, SyncTrigger};
pub use engine::{
    DeleteOutcome, DrainOutcome, OfflineStatus, SaveOutcome, SyncEngine, SyncError,
};
pub use runner::SyncRunner;
