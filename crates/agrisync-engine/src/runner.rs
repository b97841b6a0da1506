//! Sync runner - turns connectivity triggers into drain cycles
//!
//! The [`SyncRunner`] sits between the
//! [`ConnectivityMonitor`](crate::connectivity::ConnectivityMonitor) and the
//! [`SyncEngine`](crate::engine::SyncEngine). It consumes triggers from the
//! monitor's channel and runs one drain per trigger; overlapping triggers
//! collapse inside the engine's single-flight guard.
//!
//! ## Flow
//!
//! ```text
//! ConnectivityMonitor ──► mpsc::Receiver ──► SyncRunner ──► SyncEngine::drain
//! ```
//!
//! The loop terminates when the trigger channel closes (monitor dropped)
//! or the shutdown token fires.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connectivity::SyncTrigger;
use crate::engine::SyncEngine;

/// Executes drain cycles in response to connectivity triggers
pub struct SyncRunner {
    /// The engine whose drain this runner drives
    engine: Arc<SyncEngine>,
    /// Receiver for triggers from the connectivity monitor
    triggers: mpsc::Receiver<SyncTrigger>,
    /// Token for graceful shutdown
    shutdown: CancellationToken,
}

impl SyncRunner {
    /// Creates a new `SyncRunner`
    ///
    /// # Arguments
    /// * `engine` - The sync engine to drain
    /// * `triggers` - Channel receiver handed out by the connectivity monitor
    /// * `shutdown` - Token that stops the loop
    pub fn new(
        engine: Arc<SyncEngine>,
        triggers: mpsc::Receiver<SyncTrigger>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            engine,
            triggers,
            shutdown,
        }
    }

    /// Main event loop
    ///
    /// Runs until the trigger channel closes or shutdown is requested.
    /// Drain failures are logged, never propagated: they are observable
    /// through the engine's offline status and retried on the next trigger.
    pub async fn run(mut self) {
        info!("Sync runner starting");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Sync runner shutting down");
                    break;
                }

                trigger = self.triggers.recv() => {
                    match trigger {
                        Some(trigger) => {
                            debug!(?trigger, "Sync trigger received");
                            match self.engine.drain().await {
                                Ok(outcome) => debug!(?outcome, "Drain finished"),
                                Err(err) => warn!(%err, "Drain failed"),
                            }
                        }
                        None => {
                            info!("Trigger channel closed, sync runner stopping");
                            break;
                        }
                    }
                }
            }
        }

        info!("Sync runner stopped");
    }
}
