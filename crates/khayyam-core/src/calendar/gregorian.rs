//! Gregorian calendar adapter, backed by `chrono`.
//!
//! The baseline implementation of the adapter interface: the solver code
//! paths are identical for every calendar, so this adapter doubles as the
//! reference the property tests check against.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::calendar::{CalendarSystem, CivilInstant};
use crate::error::{CoreError, Result};

/// Calendar adapter for the proleptic Gregorian calendar, optionally
/// attaching an IANA zone to the instants it produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct GregorianCalendar {
    tz: Option<Tz>,
}

impl GregorianCalendar {
    pub fn new() -> Self {
        Self { tz: None }
    }

    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz: Some(tz) }
    }

    /// Builds the adapter from an IANA zone name.
    pub fn with_timezone_name(timezone: &str) -> Result<Self> {
        Ok(Self::with_timezone(crate::timezone::parse_timezone(timezone)?))
    }

    fn date(&self, year: i32, month: u32, day: u32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(CoreError::InvalidDate { year, month, day })
    }
}

impl CalendarSystem for GregorianCalendar {
    fn days_in_month(&self, year: i32, month: u32) -> Option<u32> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = match month {
            12 => NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
            _ => NaiveDate::from_ymd_opt(year, month + 1, 1)?,
        };
        Some((next - first).num_days() as u32)
    }

    fn day_of_week(&self, year: i32, month: u32, day: u32) -> Result<u32> {
        Ok(self.date(year, month, day)?.weekday().num_days_from_sunday())
    }

    fn now(&self) -> CivilInstant {
        self.from_universal(Utc::now())
    }

    fn to_universal(&self, instant: &CivilInstant) -> Result<DateTime<Utc>> {
        let invalid = CoreError::InvalidDate {
            year: instant.year,
            month: instant.month,
            day: instant.day,
        };
        let naive = self
            .date(instant.year, instant.month, instant.day)?
            .and_hms_micro_opt(
                instant.hour,
                instant.minute,
                instant.second,
                instant.microsecond,
            )
            .ok_or_else(|| invalid.clone())?;
        match instant.tz.or(self.tz) {
            Some(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .ok_or(invalid),
            None => Ok(Utc.from_utc_datetime(&naive)),
        }
    }

    fn from_universal(&self, instant: DateTime<Utc>) -> CivilInstant {
        let local = match self.tz {
            Some(tz) => instant.with_timezone(&tz).naive_local(),
            None => instant.naive_utc(),
        };
        CivilInstant {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
            microsecond: local.nanosecond() / 1_000,
            tz: self.tz,
        }
    }

    fn timezone(&self) -> Option<Tz> {
        self.tz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        let cal = GregorianCalendar::new();
        assert_eq!(cal.days_in_month(2024, 2), Some(29));
        assert_eq!(cal.days_in_month(2023, 2), Some(28));
        assert_eq!(cal.days_in_month(2024, 1), Some(31));
        assert_eq!(cal.days_in_month(2024, 4), Some(30));
        assert_eq!(cal.days_in_month(2024, 12), Some(31));
        assert_eq!(cal.days_in_month(2024, 13), None);
    }

    #[test]
    fn test_is_valid_date() {
        let cal = GregorianCalendar::new();
        assert!(cal.is_valid_date(2024, 2, 29));
        assert!(!cal.is_valid_date(2023, 2, 29));
        assert!(!cal.is_valid_date(2024, 4, 31));
    }

    #[test]
    fn test_day_of_week() {
        let cal = GregorianCalendar::new();
        // 2024-03-20 was a Wednesday.
        assert_eq!(cal.day_of_week(2024, 3, 20).unwrap(), 3);
        // 2024-01-07 was a Sunday.
        assert_eq!(cal.day_of_week(2024, 1, 7).unwrap(), 0);
    }

    #[test]
    fn test_universal_round_trip() {
        let cal = GregorianCalendar::new();
        let instant = cal.instant(2024, 3, 20, 10, 30, 0, 0).unwrap();
        let utc = cal.to_universal(&instant).unwrap();
        let back = cal.from_universal(utc);
        assert_eq!(instant.cmp_fields(&back), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_universal_respects_timezone() {
        let cal = GregorianCalendar::with_timezone(chrono_tz::America::New_York);
        let instant = cal.instant(2024, 1, 15, 1, 0, 0, 0).unwrap();
        let utc = cal.to_universal(&instant).unwrap();
        // New York is UTC-5 in January.
        assert_eq!(utc.hour(), 6);
    }
}
