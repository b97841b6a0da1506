//! Port definitions (trait interfaces for adapters)
//!
//! Driven ports in the hexagonal architecture. The sync orchestrator in
//! `agrisync-engine` depends only on these traits; concrete adapters live
//! in `agrisync-store` (SQLite) and `agrisync-api` (REST).

pub mod change_log;
pub mod local_store;
pub mod remote_api;

pub use change_log::IChangeLog;
pub use local_store::ILocalStore;
pub use remote_api::{IRemoteApi, RemoteError};
