//! Allocate command: split a plan's hours into a per-day table.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use wl_core::{Allocation, artifact};

use crate::Config;
use crate::plan::PlanArgs;

#[derive(Debug, Args)]
pub struct AllocateArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Write the allocation table to this JSON file for `wl submit`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the table as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &AllocateArgs, config: &Config) -> Result<Allocation> {
    let allocation = compute(&args.plan, config)?;

    if args.json {
        for warning in &allocation.warnings {
            eprintln!("warning: {warning}");
        }
        writeln!(writer, "{}", artifact::to_json(&allocation.table)?)?;
    } else {
        write_summary(writer, &allocation)?;
    }

    if let Some(path) = &args.output {
        artifact::save(&allocation.table, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if !args.json {
            writeln!(
                writer,
                "Wrote {} entries to {}",
                allocation.table.len(),
                path.display()
            )?;
        }
    }

    Ok(allocation)
}

/// Resolves the plan and runs the allocation engine with the configured calendar.
pub fn compute(plan: &PlanArgs, config: &Config) -> Result<Allocation> {
    let request = plan.resolve()?;
    let calendar = config.calendar();
    let allocation =
        wl_core::allocate(&request, &calendar).context("failed to allocate hours")?;
    tracing::debug!(
        working_days = allocation.working_days.len(),
        entries = allocation.table.len(),
        "allocation complete"
    );
    Ok(allocation)
}

/// Human-readable allocation summary.
pub fn write_summary<W: Write>(writer: &mut W, allocation: &Allocation) -> Result<()> {
    let days = &allocation.working_days;
    match (days.first(), days.last()) {
        (Some(first), Some(last)) => writeln!(
            writer,
            "Working days: {} ({first} to {last})",
            days.len()
        )?,
        _ => writeln!(writer, "Working days: 0")?,
    }
    for warning in &allocation.warnings {
        writeln!(writer, "Warning: {warning}")?;
    }
    writeln!(
        writer,
        "Total allocated: {:.2}h",
        allocation.table.total_hours()
    )?;

    for date in allocation.table.dates() {
        writeln!(writer)?;
        writeln!(writer, "{date}")?;
        let Some(tickets) = allocation.table.day(date) else {
            continue;
        };
        for (ticket, activities) in tickets {
            let rendered = activities
                .iter()
                .map(|(activity, hours)| format!("{activity} {hours:.2}h"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(writer, "  {ticket}: {rendered}")?;
        }
    }
    Ok(())
}
