//! Worklog submission.
//!
//! Every positive cell of an allocation table becomes one worklog request.
//! Requests go out one at a time in table order (date, ticket, activity).
//! A failed request is recorded and the run moves on; nothing is retried and
//! nothing already logged is rolled back.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use wl_core::{AllocationEntry, AllocationTable, TableError};

use crate::request::{WorklogRequest, WorklogSettings};

/// Failure of a single worklog request.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The service rejected the credentials.
    #[error("unauthorized (status {status}): {body}")]
    Unauthorized { status: u16, body: String },
    /// The service answered with a non-success status.
    #[error("rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },
    /// The request never got an answer.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The entry rounds to zero whole seconds, so it was not sent.
    #[error("{hours} hours is less than one second, not sent")]
    BelowOneSecond { hours: f64 },
}

impl SubmitError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Unauthorized { .. } => FailureKind::Unauthorized,
            Self::Rejected { .. } | Self::BelowOneSecond { .. } => FailureKind::Rejected,
            Self::Transport(_) => FailureKind::Transport,
        }
    }
}

/// Coarse classification of a failed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    Rejected,
    Transport,
}

/// Remote acknowledgement of a created worklog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Tempo's id for the new worklog, when the response carried one.
    pub worklog_id: Option<u64>,
    pub body: String,
}

impl Confirmation {
    pub fn from_body(body: String) -> Self {
        let worklog_id = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("tempoWorklogId").and_then(serde_json::Value::as_u64));
        Self { worklog_id, body }
    }
}

/// Remote service that can create worklogs.
pub trait WorklogApi {
    fn create_worklog(
        &self,
        request: &WorklogRequest,
    ) -> impl Future<Output = Result<Confirmation, SubmitError>>;
}

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorklogOutcome {
    Logged(Confirmation),
    Failed { kind: FailureKind, message: String },
}

/// Outcome of submitting one `(date, ticket, activity)` cell.
#[derive(Debug, Clone, PartialEq)]
pub struct WorklogResult {
    pub entry: AllocationEntry,
    pub outcome: WorklogOutcome,
}

impl WorklogResult {
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, WorklogOutcome::Logged(_))
    }
}

/// Per-entry results of a submission run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionReport {
    /// One result per attempted entry, in submission order.
    pub results: Vec<WorklogResult>,
    /// Positive entries skipped because the run was cancelled.
    pub not_attempted: usize,
    cancelled: bool,
}

impl SubmissionReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &WorklogResult> {
        self.results.iter().filter(|result| result.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &WorklogResult> {
        self.results.iter().filter(|result| !result.is_success())
    }

    pub const fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// True when every positive entry was attempted and logged.
    pub fn all_succeeded(&self) -> bool {
        !self.cancelled && self.failed().next().is_none()
    }

    pub fn logged_hours(&self) -> f64 {
        self.succeeded().map(|result| result.entry.hours).sum()
    }

    /// Table holding only the failed entries.
    ///
    /// Submitting this table retries the failures without duplicating
    /// worklogs that were already created.
    pub fn failed_table(&self) -> Result<AllocationTable, TableError> {
        AllocationTable::from_entries(self.failed().map(|result| result.entry.clone()))
    }
}

/// Shared flag that stops a submission run between requests.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Turns allocation tables into worklogs on a [`WorklogApi`].
#[derive(Debug)]
pub struct Submitter<A> {
    api: A,
    settings: WorklogSettings,
}

impl<A: WorklogApi> Submitter<A> {
    pub const fn new(api: A, settings: WorklogSettings) -> Self {
        Self { api, settings }
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Submits every positive entry of `table`.
    pub async fn submit(&self, table: &AllocationTable) -> SubmissionReport {
        self.submit_until_cancelled(table, &CancellationFlag::new())
            .await
    }

    /// Submits every positive entry of `table`, checking `cancel` before each
    /// request.
    pub async fn submit_until_cancelled(
        &self,
        table: &AllocationTable,
        cancel: &CancellationFlag,
    ) -> SubmissionReport {
        let pending: Vec<_> = table.entries().filter(|entry| entry.hours > 0.0).collect();
        let total = pending.len();
        tracing::debug!(entries = total, "submitting worklogs");

        let mut report = SubmissionReport::default();
        for (index, entry) in pending.into_iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                report.not_attempted = total - index;
                tracing::warn!(remaining = report.not_attempted, "submission cancelled");
                break;
            }

            let request = WorklogRequest::from_entry(&entry, &self.settings);
            let response = if request.time_spent_seconds == 0 {
                Err(SubmitError::BelowOneSecond { hours: entry.hours })
            } else {
                self.api.create_worklog(&request).await
            };
            let outcome = match response {
                Ok(confirmation) => {
                    tracing::info!(
                        date = %entry.date,
                        ticket = %entry.ticket,
                        activity = %entry.activity,
                        hours = entry.hours,
                        worklog_id = ?confirmation.worklog_id,
                        "logged worklog"
                    );
                    WorklogOutcome::Logged(confirmation)
                }
                Err(err) => {
                    tracing::warn!(
                        date = %entry.date,
                        ticket = %entry.ticket,
                        activity = %entry.activity,
                        error = %err,
                        "failed to log worklog"
                    );
                    WorklogOutcome::Failed {
                        kind: err.kind(),
                        message: err.to_string(),
                    }
                }
            };
            report.results.push(WorklogResult { entry, outcome });
        }
        report
    }
}
