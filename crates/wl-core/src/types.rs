//! Core type definitions with validation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::{Activity, ActivityEntries, ActivityKeyError, UnknownActivity};

/// Percentages are whole numbers in `0..=100`.
const MAX_PERCENT: u8 = 100;

/// Validation errors for ticket specs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The ticket identifier was empty.
    #[error("ticket id cannot be empty")]
    EmptyTicketId,

    /// The same ticket identifier appeared more than once.
    #[error("ticket {ticket} is listed more than once")]
    DuplicateTicket { ticket: String },

    /// A percentage was above 100.
    #[error("{field} for {ticket} must be between 0 and 100, got {value}")]
    PercentOutOfRange {
        ticket: String,
        field: String,
        value: u8,
    },

    /// An activity name was not recognized.
    #[error("{source} (ticket {ticket})")]
    UnknownActivity {
        ticket: String,
        source: UnknownActivity,
    },

    /// Two activity keys of one ticket named the same activity, e.g. `DEV`
    /// and `development`.
    #[error("activity {activity} is listed more than once for {ticket}")]
    DuplicateActivity { ticket: String, activity: Activity },

    /// The activity distribution did not add up to 100.
    #[error("activity percentages for {ticket} sum to {sum}, expected 100")]
    ActivitySum { ticket: String, sum: u32 },
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = crate::AllocationError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, crate::AllocationError> {
        if start > end {
            return Err(crate::AllocationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Every calendar date in the range, in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// How one ticket's share of the total is split across activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTicketSpec")]
pub struct TicketSpec {
    /// Issue key on the remote tracker (e.g. `SA-355`).
    pub id: String,

    /// Share of the total hours assigned to this ticket, in percent.
    pub percent_of_total: u8,

    /// Activity name to percent of this ticket's hours.
    #[serde(default)]
    pub activities: BTreeMap<Activity, u8>,
}

#[derive(Deserialize)]
struct RawTicketSpec {
    id: String,
    percent_of_total: u8,
    #[serde(default)]
    activities: ActivityEntries<u8>,
}

impl TryFrom<RawTicketSpec> for TicketSpec {
    type Error = ValidationError;

    fn try_from(raw: RawTicketSpec) -> Result<Self, Self::Error> {
        let activities = raw.activities.into_map().map_err(|err| match err {
            ActivityKeyError::Unknown(source) => ValidationError::UnknownActivity {
                ticket: raw.id.clone(),
                source,
            },
            ActivityKeyError::Duplicate(activity) => ValidationError::DuplicateActivity {
                ticket: raw.id.clone(),
                activity,
            },
        })?;
        Ok(Self {
            id: raw.id,
            percent_of_total: raw.percent_of_total,
            activities,
        })
    }
}

impl TicketSpec {
    pub fn new(
        id: impl Into<String>,
        percent_of_total: u8,
        activities: impl IntoIterator<Item = (Activity, u8)>,
    ) -> Self {
        Self {
            id: id.into(),
            percent_of_total,
            activities: activities.into_iter().collect(),
        }
    }

    /// Checks the percentages of a single ticket.
    ///
    /// The activity distribution must sum to exactly 100, so a ticket with
    /// no activities, or only zero ones, never validates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyTicketId);
        }
        if self.percent_of_total > MAX_PERCENT {
            return Err(ValidationError::PercentOutOfRange {
                ticket: self.id.clone(),
                field: "percent_of_total".to_string(),
                value: self.percent_of_total,
            });
        }
        if let Some((activity, &value)) = self
            .activities
            .iter()
            .find(|(_, value)| **value > MAX_PERCENT)
        {
            return Err(ValidationError::PercentOutOfRange {
                ticket: self.id.clone(),
                field: activity.to_string(),
                value,
            });
        }

        let sum: u32 = self.activities.values().map(|&pct| u32::from(pct)).sum();
        if sum != u32::from(MAX_PERCENT) {
            return Err(ValidationError::ActivitySum {
                ticket: self.id.clone(),
                sum,
            });
        }
        Ok(())
    }
}

/// Everything the allocation engine needs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRequest {
    pub range: DateRange,
    pub total_hours: f64,
    pub tickets: Vec<TicketSpec>,
}
