//! The allocation table: hours per working day, ticket, and activity.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::{Activity, ActivityEntries, ActivityKeyError, UnknownActivity};

/// Activity hours for one ticket on one day.
pub type ActivityHours = BTreeMap<Activity, f64>;

/// Ticket allocations for one day.
pub type DayAllocation = BTreeMap<String, ActivityHours>;

type Days = BTreeMap<NaiveDate, DayAllocation>;

type RawDays = BTreeMap<NaiveDate, BTreeMap<String, ActivityEntries<f64>>>;

/// Errors building a table from untrusted entries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    /// Hours were negative, NaN, or infinite.
    #[error("invalid hours for {ticket} {activity} on {date}: {hours}")]
    InvalidHours {
        date: NaiveDate,
        ticket: String,
        activity: Activity,
        hours: f64,
    },

    /// An activity name was not recognized.
    #[error("{source} (ticket {ticket} on {date})")]
    UnknownActivity {
        date: NaiveDate,
        ticket: String,
        source: UnknownActivity,
    },

    /// Two activity keys of one cell group named the same activity.
    #[error("activity {activity} is listed more than once for {ticket} on {date}")]
    DuplicateActivity {
        date: NaiveDate,
        ticket: String,
        activity: Activity,
    },
}

/// A single `(date, ticket, activity, hours)` cell of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationEntry {
    pub date: NaiveDate,
    pub ticket: String,
    pub activity: Activity,
    pub hours: f64,
}

/// Computed hours keyed by working day, then ticket, then activity.
///
/// All three levels are sorted maps, so [`AllocationTable::entries`] always
/// yields cells ordered by date, ticket, and activity. The table cannot be
/// mutated once built; zero-hour cells are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDays", into = "Days")]
pub struct AllocationTable {
    days: Days,
}

impl TryFrom<RawDays> for AllocationTable {
    type Error = TableError;

    fn try_from(raw: RawDays) -> Result<Self, Self::Error> {
        let mut days = Days::new();
        for (date, tickets) in raw {
            let day = days.entry(date).or_default();
            for (ticket, entries) in tickets {
                let activities = entries.into_map().map_err(|err| match err {
                    ActivityKeyError::Unknown(source) => TableError::UnknownActivity {
                        date,
                        ticket: ticket.clone(),
                        source,
                    },
                    ActivityKeyError::Duplicate(activity) => TableError::DuplicateActivity {
                        date,
                        ticket: ticket.clone(),
                        activity,
                    },
                })?;
                for (activity, hours) in &activities {
                    check_hours(date, &ticket, *activity, *hours)?;
                }
                day.insert(ticket, activities);
            }
        }
        Ok(Self { days })
    }
}

impl From<AllocationTable> for Days {
    fn from(table: AllocationTable) -> Self {
        table.days
    }
}

fn check_hours(
    date: NaiveDate,
    ticket: &str,
    activity: Activity,
    hours: f64,
) -> Result<(), TableError> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(())
    } else {
        Err(TableError::InvalidHours {
            date,
            ticket: ticket.to_string(),
            activity,
            hours,
        })
    }
}

impl AllocationTable {
    /// Builds a table from individual cells.
    ///
    /// A later cell for the same `(date, ticket, activity)` replaces an
    /// earlier one.
    pub fn from_entries(
        entries: impl IntoIterator<Item = AllocationEntry>,
    ) -> Result<Self, TableError> {
        let mut days = Days::new();
        for entry in entries {
            check_hours(entry.date, &entry.ticket, entry.activity, entry.hours)?;
            days.entry(entry.date)
                .or_default()
                .entry(entry.ticket)
                .or_default()
                .insert(entry.activity, entry.hours);
        }
        Ok(Self { days })
    }

    /// Used by the engine, which only produces checked values.
    pub(crate) fn from_days(days: Days) -> Self {
        debug_assert!(
            days.values()
                .flat_map(BTreeMap::values)
                .flat_map(BTreeMap::values)
                .all(|hours| hours.is_finite() && *hours >= 0.0),
            "engine produced unchecked hours"
        );
        Self { days }
    }

    /// Dates present in the table, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayAllocation> {
        self.days.get(&date)
    }

    pub fn hours(&self, date: NaiveDate, ticket: &str, activity: Activity) -> Option<f64> {
        self.days
            .get(&date)
            .and_then(|tickets| tickets.get(ticket))
            .and_then(|activities| activities.get(&activity))
            .copied()
    }

    /// Every cell, ordered by date, then ticket, then activity.
    pub fn entries(&self) -> impl Iterator<Item = AllocationEntry> + '_ {
        self.days.iter().flat_map(|(date, tickets)| {
            tickets.iter().flat_map(move |(ticket, activities)| {
                activities.iter().map(move |(activity, hours)| AllocationEntry {
                    date: *date,
                    ticket: ticket.clone(),
                    activity: *activity,
                    hours: *hours,
                })
            })
        })
    }

    /// Number of cells, including zero-hour ones.
    pub fn len(&self) -> usize {
        self.days
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_hours(&self) -> f64 {
        self.entries().map(|entry| entry.hours).sum()
    }

    /// Hours across all days and activities for one ticket.
    pub fn ticket_hours(&self, ticket: &str) -> f64 {
        self.days
            .values()
            .filter_map(|tickets| tickets.get(ticket))
            .flat_map(BTreeMap::values)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(day: u32, ticket: &str, activity: Activity, hours: f64) -> AllocationEntry {
        AllocationEntry {
            date: date(2024, 3, day),
            ticket: ticket.to_string(),
            activity,
            hours,
        }
    }

    #[test]
    fn entries_are_ordered_by_date_ticket_activity() {
        let table = AllocationTable::from_entries([
            entry(5, "SA-2", Activity::Dev, 1.0),
            entry(4, "SA-2", Activity::Meet, 1.0),
            entry(4, "SA-1", Activity::Support, 1.0),
            entry(4, "SA-1", Activity::Analysis, 1.0),
        ])
        .unwrap();

        let order: Vec<_> = table
            .entries()
            .map(|e| (e.date.day(), e.ticket, e.activity))
            .collect();
        assert_eq!(
            order,
            vec![
                (4, "SA-1".to_string(), Activity::Analysis),
                (4, "SA-1".to_string(), Activity::Support),
                (4, "SA-2".to_string(), Activity::Meet),
                (5, "SA-2".to_string(), Activity::Dev),
            ]
        );
    }

    #[test]
    fn from_entries_rejects_negative_and_nan_hours() {
        let err = AllocationTable::from_entries([entry(4, "SA-1", Activity::Dev, -1.0)]);
        assert!(matches!(err, Err(TableError::InvalidHours { .. })));

        let err = AllocationTable::from_entries([entry(4, "SA-1", Activity::Dev, f64::NAN)]);
        assert!(err.is_err());
    }

    #[test]
    fn zero_hour_cells_are_kept() {
        let table = AllocationTable::from_entries([
            entry(4, "SA-1", Activity::Dev, 8.0),
            entry(4, "SA-1", Activity::Meet, 0.0),
        ])
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.hours(date(2024, 3, 4), "SA-1", Activity::Meet), Some(0.0));
    }

    #[test]
    fn totals_sum_over_cells() {
        let table = AllocationTable::from_entries([
            entry(4, "SA-1", Activity::Dev, 2.5),
            entry(5, "SA-1", Activity::Dev, 2.5),
            entry(5, "SA-2", Activity::Bugfix, 1.0),
        ])
        .unwrap();
        assert!((table.total_hours() - 6.0).abs() < f64::EPSILON);
        assert!((table.ticket_hours("SA-1") - 5.0).abs() < f64::EPSILON);
        assert!(table.ticket_hours("SA-404").abs() < f64::EPSILON);
        assert_eq!(table.dates().count(), 2);
    }

    #[test]
    fn deserializing_refuses_to_merge_activity_spellings() {
        let err = serde_json::from_str::<AllocationTable>(
            r#"{"2024-03-04":{"SA-1":{"DEV":2,"development":3}}}"#,
        )
        .unwrap_err();
        assert!(
            err.to_string()
                .contains("activity DEV is listed more than once for SA-1 on 2024-03-04"),
            "{err}"
        );
    }

    #[test]
    fn empty_table() {
        let table = AllocationTable::default();
        assert!(table.is_empty());
        assert_eq!(table.entries().count(), 0);
    }
}
