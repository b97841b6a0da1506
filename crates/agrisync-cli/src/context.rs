//! Application wiring for CLI commands
//!
//! Builds the single engine instance each command drives: SQLite store and
//! change log, REST adapter, connectivity monitor, orchestrator. Commands
//! are one-shot, so drains happen only through `agrisync sync` and the
//! trigger channel stays unused here; the long-running
//! [`SyncRunner`](agrisync_engine::SyncRunner) path is for embedding hosts.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use agrisync_api::{ApiClient, RestRemoteApi};
use agrisync_core::config::Config;
use agrisync_engine::{ConnectivityMonitor, ConnectivityState, SyncEngine};
use agrisync_store::{DatabasePool, SqliteChangeLog, SqliteLocalStore};

/// Everything a command needs to talk to the engine
pub struct AppContext {
    pub engine: Arc<SyncEngine>,
}

impl AppContext {
    /// Builds the engine stack from configuration
    pub async fn build(config: &Config) -> Result<Self> {
        let pool = DatabasePool::new(&config.store.db_path)
            .await
            .context("Failed to open local database")?;
        let store = Arc::new(SqliteLocalStore::new(pool.pool().clone()));
        let log = Arc::new(SqliteChangeLog::new(pool.pool().clone()));

        let mut client = ApiClient::with_timeout(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
        )
        .context("Failed to build API client")?;
        if let Some(token) = &config.api.token {
            client.set_token(token);
        }
        let remote = Arc::new(RestRemoteApi::new(client));

        // No platform probe in a one-shot CLI run: degrade to the
        // configured assumption and let remote calls fail fast offline.
        let initial = if config.sync.assume_online {
            ConnectivityState::Online
        } else {
            ConnectivityState::Offline
        };
        let (monitor, _triggers) = ConnectivityMonitor::with_initial_state(initial);
        let monitor = Arc::new(monitor);

        let engine = Arc::new(SyncEngine::new(remote, store, log, monitor));

        tracing::debug!(db = %config.store.db_path.display(), "Engine context ready");
        Ok(Self { engine })
    }
}
