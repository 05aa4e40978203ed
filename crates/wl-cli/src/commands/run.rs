//! Run command: allocate a plan and submit it without an intermediate file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use wl_tempo::SubmissionReport;

use crate::Config;
use crate::commands::{allocate, submit};
use crate::plan::PlanArgs;

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Write entries that failed to this file so they can be retried alone.
    #[arg(long)]
    pub failed_output: Option<PathBuf>,
}

pub async fn run<W: Write>(
    writer: &mut W,
    args: &RunArgs,
    config: &Config,
) -> Result<SubmissionReport> {
    // Check submission settings before computing anything.
    config.worklog_settings()?;
    config.tempo_client()?;

    let allocation = allocate::compute(&args.plan, config)?;
    allocate::write_summary(writer, &allocation)?;
    writeln!(writer)?;

    submit::submit_table(
        writer,
        &allocation.table,
        config,
        args.failed_output.as_deref(),
    )
    .await
}
