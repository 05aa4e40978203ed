//! Plan files: the date range, hour pool, and ticket split for one run.
//!
//! ```toml
//! start = "2023-11-15"
//! end = "2023-12-14"
//! total_hours = 176
//!
//! [[tickets]]
//! id = "SA-355"
//! percent_of_total = 100
//! activities = { DEV = 80, MEET = 20 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use figment::Figment;
use figment::providers::{Format, Toml};
use serde::Deserialize;

use wl_core::{AllocationRequest, DateRange, TicketSpec};

/// Plan file contents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_hours: f64,
    #[serde(default)]
    pub tickets: Vec<TicketSpec>,
}

/// Command-line arguments selecting a plan and overriding its fields.
#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Plan file (TOML) with the date range, total hours, and tickets.
    #[arg(long)]
    pub plan: PathBuf,

    /// Override the plan's first day (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Override the plan's last day (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Override the plan's total hours.
    #[arg(long)]
    pub total_hours: Option<f64>,
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid plan {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(Figment::from(Toml::string(contents)).extract()?)
    }

    pub fn into_request(self) -> Result<AllocationRequest> {
        let range = DateRange::new(self.start, self.end)?;
        Ok(AllocationRequest {
            range,
            total_hours: self.total_hours,
            tickets: self.tickets,
        })
    }
}

impl PlanArgs {
    /// Loads the plan and applies command-line overrides.
    pub fn resolve(&self) -> Result<AllocationRequest> {
        let mut plan = Plan::load(&self.plan)?;
        if let Some(start) = self.start {
            plan.start = start;
        }
        if let Some(end) = self.end {
            plan.end = end;
        }
        if let Some(total_hours) = self.total_hours {
            plan.total_hours = total_hours;
        }
        tracing::debug!(?plan, "resolved plan");
        plan.into_request()
    }
}
