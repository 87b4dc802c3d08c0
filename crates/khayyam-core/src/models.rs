use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarSystem, CivilInstant};
use crate::error::{CoreError, Result};

/// Valid range for each cron field.
pub const MINUTES: RangeInclusive<u32> = 0..=59;
pub const HOURS: RangeInclusive<u32> = 0..=23;
pub const DAYS_OF_MONTH: RangeInclusive<u32> = 1..=31;
pub const MONTHS_OF_YEAR: RangeInclusive<u32> = 1..=12;
/// Day-of-week numbering follows cron convention: 0 = Sunday .. 6 = Saturday.
pub const DAYS_OF_WEEK: RangeInclusive<u32> = 0..=6;

/// A cron-style recurrence rule: the sets of allowed minutes, hours,
/// days-of-month, months and weekdays.
///
/// An unconstrained field is represented as the full range, never as an
/// empty set. The spec is immutable after construction; the solver only
/// reads it, so a single instance can be shared across threads freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceSpec {
    minutes: BTreeSet<u32>,
    hours: BTreeSet<u32>,
    days_of_month: BTreeSet<u32>,
    months_of_year: BTreeSet<u32>,
    days_of_week: BTreeSet<u32>,
}

fn check_field(
    name: &str,
    values: &BTreeSet<u32>,
    range: &RangeInclusive<u32>,
) -> Result<()> {
    if values.is_empty() {
        return Err(CoreError::InvalidSpec(format!(
            "{name} must not be empty; use the full range for an unconstrained field"
        )));
    }
    if let Some(bad) = values.iter().find(|v| !range.contains(*v)) {
        return Err(CoreError::InvalidSpec(format!(
            "{name} value {bad} outside {}..={}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

impl RecurrenceSpec {
    /// Builds a spec from the five field sets, rejecting empty sets and
    /// out-of-range values.
    ///
    /// Syntax-level parsing of cron expressions belongs to the caller; this
    /// constructor only guards the value ranges the solver relies on.
    pub fn new(
        minutes: BTreeSet<u32>,
        hours: BTreeSet<u32>,
        days_of_month: BTreeSet<u32>,
        months_of_year: BTreeSet<u32>,
        days_of_week: BTreeSet<u32>,
    ) -> Result<Self> {
        check_field("minutes", &minutes, &MINUTES)?;
        check_field("hours", &hours, &HOURS)?;
        check_field("days_of_month", &days_of_month, &DAYS_OF_MONTH)?;
        check_field("months_of_year", &months_of_year, &MONTHS_OF_YEAR)?;
        check_field("days_of_week", &days_of_week, &DAYS_OF_WEEK)?;
        Ok(Self {
            minutes,
            hours,
            days_of_month,
            months_of_year,
            days_of_week,
        })
    }

    /// The fully-unconstrained spec: every minute of every hour of every day.
    pub fn any_time() -> Self {
        Self {
            minutes: MINUTES.collect(),
            hours: HOURS.collect(),
            days_of_month: DAYS_OF_MONTH.collect(),
            months_of_year: MONTHS_OF_YEAR.collect(),
            days_of_week: DAYS_OF_WEEK.collect(),
        }
    }

    pub fn minutes(&self) -> &BTreeSet<u32> {
        &self.minutes
    }

    pub fn hours(&self) -> &BTreeSet<u32> {
        &self.hours
    }

    pub fn days_of_month(&self) -> &BTreeSet<u32> {
        &self.days_of_month
    }

    pub fn months_of_year(&self) -> &BTreeSet<u32> {
        &self.months_of_year
    }

    pub fn days_of_week(&self) -> &BTreeSet<u32> {
        &self.days_of_week
    }

    /// True when `days_of_month` covers 1..=31.
    pub fn days_of_month_unrestricted(&self) -> bool {
        self.days_of_month.len() == DAYS_OF_MONTH.count()
    }

    /// True when `months_of_year` covers 1..=12.
    pub fn months_unrestricted(&self) -> bool {
        self.months_of_year.len() == MONTHS_OF_YEAR.count()
    }
}

/// The next due occurrence, as absolute calendar fields in the calendar
/// system the solver ran against. Seconds and microseconds are always zero:
/// cron resolution stops at the minute.
///
/// This is a plain value; the caller materializes it into a concrete
/// timestamp (see [`NextOccurrence::into_instant`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextOccurrence {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
}

impl NextOccurrence {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second: 0,
            microsecond: 0,
        }
    }

    /// Materializes this occurrence through a calendar adapter, validating
    /// the date against that calendar's rules.
    pub fn into_instant<C: CalendarSystem>(self, calendar: &C) -> Result<CivilInstant> {
        calendar.instant(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.microsecond,
        )
    }
}
