//! Calendar adapter boundary.
//!
//! The solver never works with a concrete calendar directly; it talks to a
//! [`CalendarSystem`] implementation, so civil calendars with different
//! month-length and leap-year rules are interchangeable at construction
//! time. Adapters return [`CivilInstant`] values directly; there is no
//! wrapping layer and no shared base type to masquerade as.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub mod gregorian;
pub mod persian;

pub use gregorian::GregorianCalendar;
pub use persian::PersianCalendar;

/// A point in time expressed in some civil calendar: plain year/month/day
/// plus time-of-day fields and an optional IANA zone attachment.
///
/// Instants are produced fresh by adapter calls and never cached by the
/// solver. Chronological comparison is field-wise via [`cmp_fields`] and is
/// only meaningful between instants of the same calendar system; the zone
/// attachment does not participate.
///
/// [`cmp_fields`]: CivilInstant::cmp_fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivilInstant {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
    pub tz: Option<Tz>,
}

impl CivilInstant {
    /// Midnight at the start of the given civil date, zone-less.
    ///
    /// Does not validate the date; used for cursor comparisons against
    /// dates the rollover loop has already checked.
    pub(crate) fn from_date(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            microsecond: 0,
            tz: None,
        }
    }

    /// Field-wise chronological ordering, ignoring the zone attachment.
    pub fn cmp_fields(&self, other: &Self) -> Ordering {
        (
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.microsecond,
        )
            .cmp(&(
                other.year,
                other.month,
                other.day,
                other.hour,
                other.minute,
                other.second,
                other.microsecond,
            ))
    }

    /// True when both instants fall on the same civil date.
    pub fn same_date(&self, other: &Self) -> bool {
        self.year == other.year && self.month == other.month && self.day == other.day
    }
}

impl fmt::Display for CivilInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Capability interface a civil calendar system implements to be usable by
/// the recurrence solver.
///
/// Adapters must be reentrant: beyond reading the wall clock in [`now`],
/// no method has side effects, so a single adapter can serve concurrent
/// solver calls.
///
/// [`now`]: CalendarSystem::now
pub trait CalendarSystem {
    /// Number of days in the given month of the given year, or `None` when
    /// `month` is outside 1..=12.
    fn days_in_month(&self, year: i32, month: u32) -> Option<u32>;

    /// Weekday of the given date, 0 = Sunday .. 6 = Saturday.
    ///
    /// Fails with [`CoreError::InvalidDate`] when the date does not exist.
    fn day_of_week(&self, year: i32, month: u32, day: u32) -> Result<u32>;

    /// Current wall-clock time in this calendar, in the adapter's zone.
    fn now(&self) -> CivilInstant;

    /// Converts a civil instant of this calendar into a universal instant.
    fn to_universal(&self, instant: &CivilInstant) -> Result<DateTime<Utc>>;

    /// Converts a universal instant into this calendar, in the adapter's
    /// zone.
    fn from_universal(&self, instant: DateTime<Utc>) -> CivilInstant;

    /// The zone this adapter attaches to the instants it produces, if any.
    fn timezone(&self) -> Option<Tz>;

    /// Whether the given year/month/day combination exists in this
    /// calendar.
    fn is_valid_date(&self, year: i32, month: u32, day: u32) -> bool {
        day >= 1
            && self
                .days_in_month(year, month)
                .map_or(false, |len| day <= len)
    }

    /// Constructs a civil instant from explicit fields, failing with
    /// [`CoreError::InvalidDate`] when any field is out of range for this
    /// calendar.
    #[allow(clippy::too_many_arguments)]
    fn instant(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        microsecond: u32,
    ) -> Result<CivilInstant> {
        if !self.is_valid_date(year, month, day)
            || hour > 23
            || minute > 59
            || second > 59
            || microsecond > 999_999
        {
            return Err(CoreError::InvalidDate { year, month, day });
        }
        Ok(CivilInstant {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
            tz: self.timezone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_fields_orders_chronologically() {
        let earlier = CivilInstant::from_date(1402, 12, 29);
        let later = CivilInstant::from_date(1403, 1, 1);
        assert_eq!(earlier.cmp_fields(&later), Ordering::Less);
        assert_eq!(later.cmp_fields(&earlier), Ordering::Greater);
        assert_eq!(earlier.cmp_fields(&earlier), Ordering::Equal);
    }

    #[test]
    fn test_cmp_fields_uses_time_of_day() {
        let mut morning = CivilInstant::from_date(1403, 5, 10);
        morning.hour = 8;
        let midnight = CivilInstant::from_date(1403, 5, 10);
        assert_eq!(midnight.cmp_fields(&morning), Ordering::Less);
    }

    #[test]
    fn test_cmp_fields_ignores_timezone() {
        let mut a = CivilInstant::from_date(1403, 1, 1);
        let mut b = a;
        a.tz = Some(chrono_tz::Asia::Tehran);
        b.tz = None;
        assert_eq!(a.cmp_fields(&b), Ordering::Equal);
    }

    #[test]
    fn test_same_date() {
        let mut a = CivilInstant::from_date(1403, 1, 1);
        a.hour = 10;
        let b = CivilInstant::from_date(1403, 1, 1);
        assert!(a.same_date(&b));
        assert!(!a.same_date(&CivilInstant::from_date(1403, 1, 2)));
    }

    #[test]
    fn test_display_format() {
        let mut instant = CivilInstant::from_date(1403, 1, 1);
        instant.hour = 9;
        instant.minute = 5;
        assert_eq!(instant.to_string(), "1403-01-01 09:05:00");
    }
}
