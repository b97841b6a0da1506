//! Status command - Display offline/sync status
//!
//! Provides the `agrisync status` CLI command which shows the current
//! connectivity assumption, the number of queued pending changes, and the
//! time of the last fully successful drain.

use anyhow::{Context, Result};
use clap::Args;

use agrisync_core::config::Config;

use crate::context::AppContext;
use crate::output::OutputFormat;

/// Show offline/synchronization status
#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let ctx = AppContext::build(config).await?;

        let status = ctx
            .engine
            .offline_status()
            .await
            .context("Failed to query offline status")?;

        if format.is_json() {
            format.json(&serde_json::json!({
                "is_online": status.is_online,
                "pending_changes": status.pending_changes,
                "last_sync": status.last_sync.map(|t| t.to_rfc3339()),
            }));
            return Ok(());
        }

        format.success("Agrisync status");
        format.line(&format!(
            "Connectivity:    {}",
            if status.is_online { "online" } else { "offline" }
        ));
        format.line(&format!("Pending changes: {}", status.pending_changes));
        format.line(&format!(
            "Last sync:       {}",
            status
                .last_sync
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string())
        ));

        Ok(())
    }
}
