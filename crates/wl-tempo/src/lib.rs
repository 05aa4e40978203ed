//! Tempo integration for worklog splitting.
//!
//! Turns an allocation table into Tempo worklogs:
//! - [`WorklogRequest`]: the request body for one table cell
//! - [`Submitter`]: sequential, best-effort submission with per-entry results
//! - [`TempoClient`]: the HTTP implementation of [`WorklogApi`]

mod client;
mod request;
mod submit;

pub use client::{ClientError, DEFAULT_API_URL, TempoClient};
pub use request::{
    DEFAULT_ATTRIBUTE_KEY, DEFAULT_DESCRIPTION, WorkAttribute, WorklogRequest, WorklogSettings,
};
pub use submit::{
    CancellationFlag, Confirmation, FailureKind, SubmissionReport, SubmitError, Submitter,
    WorklogApi, WorklogOutcome, WorklogResult,
};
