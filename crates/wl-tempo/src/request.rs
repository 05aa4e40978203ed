//! Worklog request bodies.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use wl_core::AllocationEntry;

/// Attribute key Tempo uses for the account/activity classification.
pub const DEFAULT_ATTRIBUTE_KEY: &str = "_Account_";

/// Default worklog description; `{ticket}` and `{activity}` are substituted.
pub const DEFAULT_DESCRIPTION: &str = "Worked on {ticket}";

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Fixed values stamped onto every worklog of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogSettings {
    /// Tempo/Jira account the worklogs are booked for.
    pub account_id: String,
    /// Time of day every worklog starts at.
    pub start_time: NaiveTime,
    pub attribute_key: String,
    pub description: String,
}

impl WorklogSettings {
    /// Settings with the default 09:00 start, attribute key, and description.
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            attribute_key: DEFAULT_ATTRIBUTE_KEY.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// A `{key, value}` worklog attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkAttribute {
    pub key: String,
    pub value: String,
}

/// Body of a Tempo worklog-creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogRequest {
    pub issue_key: String,
    pub time_spent_seconds: u64,
    pub start_date: NaiveDate,
    pub start_time: String,
    pub description: String,
    pub author_account_id: String,
    pub attributes: Vec<WorkAttribute>,
}

impl WorklogRequest {
    /// Builds the request for one table cell.
    pub fn from_entry(entry: &AllocationEntry, settings: &WorklogSettings) -> Self {
        let activity = entry.activity.as_str();
        let description = settings
            .description
            .replace("{ticket}", &entry.ticket)
            .replace("{activity}", activity);
        Self {
            issue_key: entry.ticket.clone(),
            time_spent_seconds: hours_to_seconds(entry.hours),
            start_date: entry.date,
            start_time: settings.start_time.format("%H:%M:%S").to_string(),
            description,
            author_account_id: settings.account_id.clone(),
            attributes: vec![WorkAttribute {
                key: settings.attribute_key.clone(),
                value: activity.to_string(),
            }],
        }
    }
}

/// Tempo only accepts whole seconds.
///
/// Anything under half a second rounds to 0. [`crate::Submitter`] records
/// such entries as failed instead of sending them.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "table hours are finite and non-negative"
)]
fn hours_to_seconds(hours: f64) -> u64 {
    (hours * SECONDS_PER_HOUR).round() as u64
}
