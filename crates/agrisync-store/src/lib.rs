//! Agrisync Store - Local state persistence
//!
//! SQLite-based persistence for:
//! - Cached Calendar and Event collections
//! - The append-only pending-change log
//! - Sync bookkeeping (last successful drain timestamp)
//!
//! ## Architecture
//!
//! This crate implements the `ILocalStore` and `IChangeLog` ports from
//! `agrisync-core` using SQLite as the storage backend. It is a driven
//! (secondary) adapter in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteLocalStore`] - `ILocalStore` implementation
//! - [`SqliteChangeLog`] - `IChangeLog` implementation
//! - [`StoreError`] - Error types for store operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use agrisync_store::{DatabasePool, SqliteChangeLog, SqliteLocalStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/agrisync/agrisync.db")).await?;
//! let store = SqliteLocalStore::new(pool.pool().clone());
//! let log = SqliteChangeLog::new(pool.pool().clone());
//! // Use store as ILocalStore and log as IChangeLog...
//! # Ok(())
//! # }
//! ```

pub mod change_log;
pub mod pool;
pub mod store;

pub use change_log::SqliteChangeLog;
pub use pool::DatabasePool;
pub use store::SqliteLocalStore;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
