//! Event commands - add and delete calendar events

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use agrisync_core::config::Config;
use agrisync_core::domain::calendar::Event;
use agrisync_core::domain::newtypes::{CalendarId, EventId};

use crate::context::AppContext;
use crate::output::OutputFormat;

/// Manage calendar events
#[derive(Debug, Subcommand)]
pub enum EventCommand {
    /// Add an event to a calendar
    Add(AddEventArgs),
    /// Delete an event from a calendar
    Delete(DeleteEventArgs),
}

#[derive(Debug, Args)]
pub struct AddEventArgs {
    /// Server identifier of the calendar
    pub calendar: String,

    /// Activity kind (e.g. "irrigation")
    #[arg(long)]
    pub kind: String,

    /// Activity date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeleteEventArgs {
    /// Server identifier of the calendar
    pub calendar: String,

    /// Server identifier of the event
    pub event: String,
}

impl EventCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        match self {
            EventCommand::Add(args) => args.execute(config, format).await,
            EventCommand::Delete(args) => args.execute(config, format).await,
        }
    }
}

impl AddEventArgs {
    async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let date: NaiveDate = self
            .date
            .parse()
            .context("Invalid date (expected YYYY-MM-DD)")?;
        let calendar_id = CalendarId::new(self.calendar.clone())?;

        let mut event = Event::new(calendar_id.clone(), self.kind.clone(), date)?;
        if let Some(notes) = &self.notes {
            event = event.with_notes(notes.clone());
        }

        let ctx = AppContext::build(config).await?;
        let outcome = ctx.engine.save_event(calendar_id, event).await?;

        if format.is_json() {
            format.json(&serde_json::json!({
                "queued": outcome.queued,
                "id": outcome.record.id.as_ref().map(|i| i.as_str()),
                "kind": outcome.record.kind,
                "date": outcome.record.date.to_string(),
            }));
            return Ok(());
        }

        if outcome.queued {
            format.success(&format!(
                "Event '{}' on {} saved locally; will sync when online",
                outcome.record.kind, outcome.record.date
            ));
        } else {
            format.success(&format!(
                "Event '{}' on {} saved (id: {})",
                outcome.record.kind,
                outcome.record.date,
                outcome
                    .record
                    .id
                    .as_ref()
                    .map(|i| i.as_str())
                    .unwrap_or("-")
            ));
        }

        Ok(())
    }
}

impl DeleteEventArgs {
    async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let calendar_id = CalendarId::new(self.calendar.clone())?;
        let event_id = EventId::new(self.event.clone())?;

        let ctx = AppContext::build(config).await?;
        let outcome = ctx.engine.delete_event(calendar_id, event_id).await?;

        if format.is_json() {
            format.json(&serde_json::json!({ "queued": outcome.queued }));
            return Ok(());
        }

        if outcome.queued {
            format.success("Event removed locally; remote deletion queued");
        } else {
            format.success("Event deleted");
        }

        Ok(())
    }
}
