//! Sync command - Drain the pending-change log now
//!
//! Provides the `agrisync sync` CLI command, the manual retry entry point.
//! Runs one drain cycle and reports how far it got.

use anyhow::{Context, Result};
use clap::Args;

use agrisync_core::config::Config;
use agrisync_engine::DrainOutcome;

use crate::context::AppContext;
use crate::output::OutputFormat;

/// Replay queued changes against the server
#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let ctx = AppContext::build(config).await?;

        let outcome = ctx
            .engine
            .force_sync()
            .await
            .context("Sync failed against the local store")?;

        if format.is_json() {
            let value = match outcome {
                DrainOutcome::Completed { processed } => {
                    serde_json::json!({"outcome": "completed", "processed": processed})
                }
                DrainOutcome::Stopped {
                    processed,
                    remaining,
                } => serde_json::json!({
                    "outcome": "stopped",
                    "processed": processed,
                    "remaining": remaining,
                }),
                DrainOutcome::AlreadyDraining => {
                    serde_json::json!({"outcome": "already_draining"})
                }
            };
            format.json(&value);
            return Ok(());
        }

        match outcome {
            DrainOutcome::Completed { processed: 0 } => {
                format.success("Nothing to sync");
            }
            DrainOutcome::Completed { processed } => {
                format.success(&format!("Synced {} pending change(s)", processed));
            }
            DrainOutcome::Stopped {
                processed,
                remaining,
            } => {
                format.success(&format!(
                    "Synced {} change(s); {} still queued (will retry)",
                    processed, remaining
                ));
            }
            DrainOutcome::AlreadyDraining => {
                format.success("A sync is already running");
            }
        }

        Ok(())
    }
}
