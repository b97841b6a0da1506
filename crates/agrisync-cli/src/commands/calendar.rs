//! Calendar commands - save and list season calendars

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use agrisync_core::config::Config;
use agrisync_core::domain::calendar::Calendar;
use agrisync_core::domain::newtypes::{CalendarId, OwnerId};

use crate::context::AppContext;
use crate::output::OutputFormat;

/// Manage season calendars
#[derive(Debug, Subcommand)]
pub enum CalendarCommand {
    /// Create or update a calendar
    Save(SaveCalendarArgs),
    /// List calendars (authoritative from the server when online)
    List(ListCalendarsArgs),
}

#[derive(Debug, Args)]
pub struct SaveCalendarArgs {
    /// Owner account identifier
    #[arg(long)]
    pub owner: String,

    /// Crop name (e.g. "maize")
    #[arg(long)]
    pub crop: String,

    /// Planting date (YYYY-MM-DD)
    #[arg(long)]
    pub planting: String,

    /// Harvest date (YYYY-MM-DD)
    #[arg(long)]
    pub harvest: String,

    /// Server identifier of an existing calendar to update
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListCalendarsArgs {}

impl CalendarCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        match self {
            CalendarCommand::Save(args) => args.execute(config, format).await,
            CalendarCommand::List(args) => args.execute(config, format).await,
        }
    }
}

impl SaveCalendarArgs {
    async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let planting: NaiveDate = self
            .planting
            .parse()
            .context("Invalid planting date (expected YYYY-MM-DD)")?;
        let harvest: NaiveDate = self
            .harvest
            .parse()
            .context("Invalid harvest date (expected YYYY-MM-DD)")?;

        let owner = OwnerId::new(self.owner.clone())?;
        let mut calendar = Calendar::new(owner, self.crop.clone(), planting, harvest)?;
        if let Some(id) = &self.id {
            calendar.id = Some(CalendarId::new(id.clone())?);
        }

        let ctx = AppContext::build(config).await?;
        let outcome = ctx.engine.save_calendar(calendar).await?;

        if format.is_json() {
            format.json(&serde_json::json!({
                "queued": outcome.queued,
                "id": outcome.record.id.as_ref().map(|i| i.as_str()),
                "crop": outcome.record.crop,
            }));
            return Ok(());
        }

        if outcome.queued {
            format.success(&format!(
                "Calendar '{}' saved locally; will sync when online",
                outcome.record.crop
            ));
        } else {
            format.success(&format!(
                "Calendar '{}' saved (id: {})",
                outcome.record.crop,
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

impl ListCalendarsArgs {
    async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let ctx = AppContext::build(config).await?;
        let calendars = ctx.engine.get_calendars().await?;

        if format.is_json() {
            let items: Vec<_> = calendars
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.id.as_ref().map(|i| i.as_str()),
                        "owner": c.owner.as_str(),
                        "crop": c.crop,
                        "planting_date": c.planting_date.to_string(),
                        "harvest_date": c.harvest_date.to_string(),
                        "events": c.events.len(),
                    })
                })
                .collect();
            format.json(&serde_json::json!({ "calendars": items }));
            return Ok(());
        }

        if calendars.is_empty() {
            format.success("No calendars");
            return Ok(());
        }

        format.success(&format!("{} calendar(s)", calendars.len()));
        format.line("Id             Crop         Planting    Harvest     Events");
        format.line("-------------- ------------ ----------- ----------- ------");
        for calendar in &calendars {
            format.line(&format!(
                "{:<14} {:<12} {:<11} {:<11} {}",
                calendar
                    .id
                    .as_ref()
                    .map(|i| i.as_str())
                    .unwrap_or("(pending)"),
                calendar.crop,
                calendar.planting_date,
                calendar.harvest_date,
                calendar.events.len()
            ));
        }

        Ok(())
    }
}
