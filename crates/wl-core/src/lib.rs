//! Core domain logic for splitting work hours into worklogs.
//!
//! This crate contains:
//! - Allocation: dividing a pool of hours across working days, tickets, and activities
//! - Calendars: deciding which weekdays count as working days
//! - Artifacts: the JSON file an allocation table is handed off in

pub mod activity;
mod allocation;
pub mod artifact;
pub mod calendar;
mod table;
mod types;

pub use activity::{Activity, UnknownActivity};
pub use allocation::{
    Allocation, AllocationError, AllocationWarning, STANDARD_DAY_HOURS, allocate, allocate_with,
    working_days,
};
pub use artifact::ArtifactError;
pub use calendar::{EveryDay, HolidayList, WorkingDayCalendar};
pub use table::{ActivityHours, AllocationEntry, AllocationTable, DayAllocation, TableError};
pub use types::{AllocationRequest, DateRange, TicketSpec, ValidationError};
