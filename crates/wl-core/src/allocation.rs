//! Hour allocation algorithm.
//!
//! Splits a pool of hours across the working days of a date range, then across
//! tickets and activities by percentage.
//!
//! # Algorithm Summary
//!
//! 1. Validate every ticket; any invalid ticket aborts the run before work starts
//! 2. Collect working days: weekdays the calendar does not exclude
//! 3. `ticket_hours = total * (percent_of_total / 100)`, split evenly per working day
//! 4. `activity_hours = daily_hours * (activity_percent / 100)`
//!
//! Percentages are applied as ratios so every intermediate stays at or below
//! `total_hours` and cannot overflow.
//!
//! No rounding is applied. Percentages across tickets are not required to add
//! up to 100.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::{WorkingDayCalendar, is_weekend};
use crate::table::{ActivityHours, AllocationTable, DayAllocation};
use crate::types::{AllocationRequest, DateRange, TicketSpec, ValidationError};

/// Average daily hours that do not trigger a warning.
pub const STANDARD_DAY_HOURS: f64 = 8.0;

/// Errors that stop an allocation run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AllocationError {
    /// One or more tickets failed validation. Every invalid ticket is listed.
    #[error("invalid tickets: {}", join_errors(.0))]
    InvalidTickets(Vec<ValidationError>),

    /// The range holds no working day, so there is nothing to divide by.
    #[error("no working days between {start} and {end}")]
    NoWorkingDays { start: NaiveDate, end: NaiveDate },

    /// The range ends before it starts.
    #[error("date range start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Total hours were negative, NaN, or infinite.
    #[error("total hours must be a non-negative number, got {0}")]
    InvalidTotalHours(f64),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Advisory conditions that do not stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationWarning {
    /// The average day is longer or shorter than [`STANDARD_DAY_HOURS`].
    NonStandardDay { average_hours: f64 },
}

impl fmt::Display for AllocationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonStandardDay { average_hours } => write!(
                f,
                "average working hours per day is {average_hours}, which is not equal to {STANDARD_DAY_HOURS}"
            ),
        }
    }
}

/// Output of a successful allocation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Hours per working day, ticket, and activity.
    pub table: AllocationTable,

    /// Qualifying working days, ascending.
    pub working_days: Vec<NaiveDate>,

    pub warnings: Vec<AllocationWarning>,
}

/// Runs the allocation described by `request`.
pub fn allocate<C>(request: &AllocationRequest, calendar: &C) -> Result<Allocation, AllocationError>
where
    C: WorkingDayCalendar + ?Sized,
{
    allocate_with(
        request.range,
        request.total_hours,
        &request.tickets,
        calendar,
    )
}

/// Splits `total_hours` over the working days in `range` and across `tickets`.
///
/// # Errors
///
/// * [`AllocationError::InvalidTickets`] if any ticket fails validation
/// * [`AllocationError::InvalidTotalHours`] for negative or non-finite hours
/// * [`AllocationError::NoWorkingDays`] if no date in the range qualifies
pub fn allocate_with<C>(
    range: DateRange,
    total_hours: f64,
    tickets: &[TicketSpec],
    calendar: &C,
) -> Result<Allocation, AllocationError>
where
    C: WorkingDayCalendar + ?Sized,
{
    validate_tickets(tickets)?;
    if !total_hours.is_finite() || total_hours < 0.0 {
        return Err(AllocationError::InvalidTotalHours(total_hours));
    }

    let working_days = working_days(range, calendar);
    if working_days.is_empty() {
        return Err(AllocationError::NoWorkingDays {
            start: range.start(),
            end: range.end(),
        });
    }
    #[expect(
        clippy::cast_precision_loss,
        reason = "day counts are far below f64 mantissa limits"
    )]
    let num_days = working_days.len() as f64;
    tracing::debug!(
        working_days = working_days.len(),
        tickets = tickets.len(),
        total_hours,
        "allocating hours"
    );

    let mut warnings = Vec::new();
    let average_hours = total_hours / num_days;
    #[expect(
        clippy::float_cmp,
        reason = "the warning fires on any deviation from exactly 8 hours"
    )]
    let is_standard_day = average_hours == STANDARD_DAY_HOURS;
    if !is_standard_day {
        tracing::warn!(average_hours, "average day differs from standard day");
        warnings.push(AllocationWarning::NonStandardDay { average_hours });
    }

    // Every working day gets the same split, so compute it once.
    let day: DayAllocation = tickets
        .iter()
        .map(|ticket| {
            let ticket_hours = total_hours * ratio(ticket.percent_of_total);
            let daily_hours = ticket_hours / num_days;
            let activities: ActivityHours = ticket
                .activities
                .iter()
                .map(|(activity, pct)| (*activity, daily_hours * ratio(*pct)))
                .collect();
            (ticket.id.clone(), activities)
        })
        .collect();

    let days: BTreeMap<_, _> = working_days
        .iter()
        .map(|date| (*date, day.clone()))
        .collect();

    Ok(Allocation {
        table: AllocationTable::from_days(days),
        working_days,
        warnings,
    })
}

fn ratio(percent: u8) -> f64 {
    f64::from(percent) / 100.0
}

/// Dates in `range` that are weekdays and not excluded by `calendar`.
pub fn working_days<C>(range: DateRange, calendar: &C) -> Vec<NaiveDate>
where
    C: WorkingDayCalendar + ?Sized,
{
    range
        .days()
        .filter(|date| !is_weekend(*date) && calendar.is_working_day(*date))
        .collect()
}

fn validate_tickets(tickets: &[TicketSpec]) -> Result<(), AllocationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for ticket in tickets {
        if let Err(err) = ticket.validate() {
            errors.push(err);
        } else if !seen.insert(ticket.id.as_str()) {
            errors.push(ValidationError::DuplicateTicket {
                ticket: ticket.id.clone(),
            });
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AllocationError::InvalidTickets(errors))
    }
}
