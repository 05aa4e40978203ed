//! Working-day calendars.
//!
//! The allocation engine excludes weekends itself. Everything else (public
//! holidays, company closures) is decided by a [`WorkingDayCalendar`] handed
//! in by the caller.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};

/// Decides whether a weekday counts as a working day.
pub trait WorkingDayCalendar {
    fn is_working_day(&self, date: NaiveDate) -> bool;
}

impl<F> WorkingDayCalendar for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_working_day(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Calendar without holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct EveryDay;

impl WorkingDayCalendar for EveryDay {
    fn is_working_day(&self, _date: NaiveDate) -> bool {
        true
    }
}

/// Calendar backed by an explicit list of non-working dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayList {
    holidays: BTreeSet<NaiveDate>,
}

impl HolidayList {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}

impl WorkingDayCalendar for HolidayList {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date)
    }
}

pub(crate) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
