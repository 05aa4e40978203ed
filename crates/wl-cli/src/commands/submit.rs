//! Submit command: log an allocation table to Tempo.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use wl_core::{AllocationTable, artifact};
use wl_tempo::{CancellationFlag, SubmissionReport, Submitter, WorklogApi, WorklogOutcome};

use crate::Config;

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Allocation table written by `wl allocate --output`.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write entries that failed to this file so they can be retried alone.
    #[arg(long)]
    pub failed_output: Option<PathBuf>,
}

pub async fn run<W: Write>(
    writer: &mut W,
    args: &SubmitArgs,
    config: &Config,
) -> Result<SubmissionReport> {
    let table = artifact::load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    submit_table(writer, &table, config, args.failed_output.as_deref()).await
}

/// Submits `table` with the configured Tempo client, stopping early on Ctrl-C.
pub async fn submit_table<W: Write>(
    writer: &mut W,
    table: &AllocationTable,
    config: &Config,
    failed_output: Option<&Path>,
) -> Result<SubmissionReport> {
    let settings = config.worklog_settings()?;
    let client = config.tempo_client()?;
    let submitter = Submitter::new(client, settings);

    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    submit_with(writer, &submitter, table, &cancel, failed_output).await
}

/// Runs a submission and reports each entry as it is recorded.
pub async fn submit_with<W: Write, A: WorklogApi>(
    writer: &mut W,
    submitter: &Submitter<A>,
    table: &AllocationTable,
    cancel: &CancellationFlag,
    failed_output: Option<&Path>,
) -> Result<SubmissionReport> {
    let report = submitter.submit_until_cancelled(table, cancel).await;
    write_report(writer, &report)?;

    if let Some(path) = failed_output {
        let failed = report.failed_table()?;
        if !failed.is_empty() {
            artifact::save(&failed, path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(
                writer,
                "Wrote {} failed entries to {}",
                failed.len(),
                path.display()
            )?;
        }
    }
    Ok(report)
}

pub fn write_report<W: Write>(writer: &mut W, report: &SubmissionReport) -> Result<()> {
    for result in &report.results {
        let entry = &result.entry;
        match &result.outcome {
            WorklogOutcome::Logged(confirmation) => {
                write!(
                    writer,
                    "Logged {:.2} hours of {} for {} on {}",
                    entry.hours, entry.activity, entry.ticket, entry.date
                )?;
                if let Some(id) = confirmation.worklog_id {
                    write!(writer, " (worklog {id})")?;
                }
                writeln!(writer)?;
            }
            WorklogOutcome::Failed { message, .. } => writeln!(
                writer,
                "Failed to log {:.2} hours of {} for {} on {}: {message}",
                entry.hours, entry.activity, entry.ticket, entry.date
            )?,
        }
    }

    let succeeded = report.succeeded().count();
    let failed = report.failed().count();
    write!(
        writer,
        "Logged {succeeded} of {} worklogs ({:.2}h)",
        report.results.len() + report.not_attempted,
        report.logged_hours()
    )?;
    if failed > 0 {
        write!(writer, ", {failed} failed")?;
    }
    if report.was_cancelled() {
        write!(
            writer,
            ", cancelled with {} not attempted",
            report.not_attempted
        )?;
    }
    writeln!(writer)?;
    Ok(())
}
