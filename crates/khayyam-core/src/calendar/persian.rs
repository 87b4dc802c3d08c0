//! Jalali (Solar Hijri) calendar adapter.
//!
//! Month lengths: Farvardin through Shahrivar (1-6) have 31 days, Mehr
//! through Bahman (7-11) have 30, and Esfand (12) has 29, or 30 in a leap
//! year. Leap years follow the 33-year arithmetic cycle; conversion to and
//! from the Gregorian calendar goes through a linear day count anchored at
//! Gregorian 1600-01-01 (Jalali 979-01-01 = 1600-03-20).

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::calendar::{CalendarSystem, CivilInstant};
use crate::error::{CoreError, Result};

/// Common-year month lengths; Esfand gains a 30th day in leap years.
const MONTH_LENGTHS: [u32; 12] = [31, 31, 31, 31, 31, 31, 30, 30, 30, 30, 30, 29];

/// Days from 0001-01-01 CE to the conversion anchor 1600-01-01.
const ANCHOR_CE: i64 = 584_023;

/// Days from the anchor to Jalali 979-01-01.
const EPOCH_OFFSET: i64 = 79;

/// Jalali year the day count is measured from.
const EPOCH_YEAR: i64 = 979;

/// Days in one 33-year cycle (8 leap years) and one 4-year sub-cycle.
const CYCLE_DAYS: i64 = 12_053;
const QUAD_DAYS: i64 = 1_461;

/// Returns whether the given Jalali year is a leap year (Esfand has 30
/// days).
pub fn is_leap_year(year: i32) -> bool {
    matches!(
        year.rem_euclid(33),
        1 | 5 | 9 | 13 | 17 | 22 | 26 | 30
    )
}

/// Days from Jalali 979-01-01 to the given date. The date is not
/// validated; callers check `is_valid_date` first.
fn day_number(year: i32, month: u32, day: u32) -> i64 {
    let relative = i64::from(year) - EPOCH_YEAR;
    let mut days = 365 * relative
        + relative.div_euclid(33) * 8
        + (relative.rem_euclid(33) + 3) / 4;
    for len in &MONTH_LENGTHS[..(month - 1) as usize] {
        days += i64::from(*len);
    }
    days + i64::from(day) - 1
}

/// Inverse of [`day_number`]: decomposes a day count into year/month/day.
fn date_from_day_number(days: i64) -> (i32, u32, u32) {
    let cycles = days.div_euclid(CYCLE_DAYS);
    let mut in_cycle = days.rem_euclid(CYCLE_DAYS);

    let mut year = EPOCH_YEAR + 33 * cycles + 4 * (in_cycle / QUAD_DAYS);
    in_cycle %= QUAD_DAYS;
    // The first year of each 4-year sub-cycle is the leap one and absorbs
    // day 366; later years are 365 days each.
    if in_cycle >= 366 {
        year += (in_cycle - 1) / 365;
        in_cycle = (in_cycle - 1) % 365;
    }

    let mut day_of_year = in_cycle as u32;
    for (index, len) in MONTH_LENGTHS[..11].iter().enumerate() {
        if day_of_year < *len {
            return (year as i32, index as u32 + 1, day_of_year + 1);
        }
        day_of_year -= *len;
    }
    // Whatever remains lands in Esfand, including day 30 of a leap year.
    (year as i32, 12, day_of_year + 1)
}

/// Calendar adapter for the Jalali calendar, optionally attaching an IANA
/// zone to the instants it produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersianCalendar {
    tz: Option<Tz>,
}

impl PersianCalendar {
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

    /// Gregorian equivalent of a Jalali date.
    pub fn to_gregorian_date(&self, year: i32, month: u32, day: u32) -> Result<NaiveDate> {
        if !self.is_valid_date(year, month, day) {
            return Err(CoreError::InvalidDate { year, month, day });
        }
        let ce = day_number(year, month, day) + EPOCH_OFFSET + ANCHOR_CE;
        let ce = i32::try_from(ce).map_err(|_| CoreError::InvalidDate { year, month, day })?;
        NaiveDate::from_num_days_from_ce_opt(ce)
            .ok_or(CoreError::InvalidDate { year, month, day })
    }

    /// Jalali equivalent of a Gregorian date.
    pub fn from_gregorian_date(&self, date: NaiveDate) -> (i32, u32, u32) {
        let days = i64::from(date.num_days_from_ce()) - ANCHOR_CE - EPOCH_OFFSET;
        date_from_day_number(days)
    }
}

impl CalendarSystem for PersianCalendar {
    fn days_in_month(&self, year: i32, month: u32) -> Option<u32> {
        match month {
            12 => Some(if is_leap_year(year) { 30 } else { 29 }),
            1..=11 => Some(MONTH_LENGTHS[(month - 1) as usize]),
            _ => None,
        }
    }

    fn day_of_week(&self, year: i32, month: u32, day: u32) -> Result<u32> {
        let date = self.to_gregorian_date(year, month, day)?;
        Ok(date.weekday().num_days_from_sunday())
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
        let date = self.to_gregorian_date(instant.year, instant.month, instant.day)?;
        let naive = date
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
        let (year, month, day) = self.from_gregorian_date(local.date());
        CivilInstant {
            year,
            month,
            day,
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
    use rstest::rstest;

    #[rstest]
    #[case(1399, true)]
    #[case(1400, false)]
    #[case(1401, false)]
    #[case(1402, false)]
    #[case(1403, true)]
    #[case(1407, false)]
    #[case(1408, true)]
    fn test_leap_years(#[case] year: i32, #[case] leap: bool) {
        assert_eq!(is_leap_year(year), leap);
    }

    #[test]
    fn test_days_in_month() {
        let cal = PersianCalendar::new();
        assert_eq!(cal.days_in_month(1403, 1), Some(31));
        assert_eq!(cal.days_in_month(1403, 6), Some(31));
        assert_eq!(cal.days_in_month(1403, 7), Some(30));
        assert_eq!(cal.days_in_month(1403, 11), Some(30));
        assert_eq!(cal.days_in_month(1403, 12), Some(30)); // leap year
        assert_eq!(cal.days_in_month(1402, 12), Some(29));
        assert_eq!(cal.days_in_month(1403, 0), None);
        assert_eq!(cal.days_in_month(1403, 13), None);
    }

    #[test]
    fn test_is_valid_date() {
        let cal = PersianCalendar::new();
        assert!(cal.is_valid_date(1403, 12, 30));
        assert!(!cal.is_valid_date(1402, 12, 30));
        assert!(!cal.is_valid_date(1403, 7, 31));
        assert!(!cal.is_valid_date(1403, 1, 0));
        assert!(!cal.is_valid_date(1403, 13, 1));
    }

    #[rstest]
    #[case((1400, 1, 1), (2021, 3, 21))]
    #[case((1403, 1, 1), (2024, 3, 20))]
    #[case((1399, 12, 30), (2021, 3, 20))]
    #[case((1402, 12, 29), (2024, 3, 19))]
    #[case((979, 1, 1), (1600, 3, 20))]
    fn test_gregorian_conversion(
        #[case] jalali: (i32, u32, u32),
        #[case] gregorian: (i32, u32, u32),
    ) {
        let cal = PersianCalendar::new();
        let date = cal.to_gregorian_date(jalali.0, jalali.1, jalali.2).unwrap();
        assert_eq!(
            (date.year(), date.month(), date.day()),
            gregorian,
            "jalali {jalali:?}"
        );
        assert_eq!(cal.from_gregorian_date(date), jalali);
    }

    #[test]
    fn test_conversion_round_trip_across_years() {
        let cal = PersianCalendar::new();
        for year in 1395..1410 {
            for month in 1..=12 {
                let last = cal.days_in_month(year, month).unwrap();
                for day in [1, 15, last] {
                    let date = cal.to_gregorian_date(year, month, day).unwrap();
                    assert_eq!(cal.from_gregorian_date(date), (year, month, day));
                }
            }
        }
    }

    #[test]
    fn test_day_of_week() {
        let cal = PersianCalendar::new();
        // 1403-01-01 = 2024-03-20, a Wednesday.
        assert_eq!(cal.day_of_week(1403, 1, 1).unwrap(), 3);
        // 1400-01-01 = 2021-03-21, a Sunday.
        assert_eq!(cal.day_of_week(1400, 1, 1).unwrap(), 0);
    }

    #[test]
    fn test_day_of_week_rejects_invalid_date() {
        let cal = PersianCalendar::new();
        assert!(matches!(
            cal.day_of_week(1402, 12, 30),
            Err(CoreError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_instant_validates_fields() {
        let cal = PersianCalendar::new();
        assert!(cal.instant(1403, 12, 30, 0, 0, 0, 0).is_ok());
        assert!(cal.instant(1402, 12, 30, 0, 0, 0, 0).is_err());
        assert!(cal.instant(1403, 1, 1, 24, 0, 0, 0).is_err());
        assert!(cal.instant(1403, 1, 1, 0, 60, 0, 0).is_err());
    }

    #[test]
    fn test_universal_round_trip() {
        let cal = PersianCalendar::new();
        let instant = cal.instant(1403, 5, 10, 14, 30, 0, 0).unwrap();
        let utc = cal.to_universal(&instant).unwrap();
        let back = cal.from_universal(utc);
        assert_eq!(instant.cmp_fields(&back), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_universal_respects_timezone() {
        let cal = PersianCalendar::with_timezone(chrono_tz::Asia::Tehran);
        let instant = cal.instant(1403, 9, 1, 0, 30, 0, 0).unwrap();
        let utc = cal.to_universal(&instant).unwrap();
        // Tehran is UTC+03:30 in winter, so local 00:30 is 21:00 the
        // previous UTC day.
        assert_eq!(utc.hour(), 21);
        let back = cal.from_universal(utc);
        assert_eq!(instant.cmp_fields(&back), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_now_produces_valid_date() {
        let cal = PersianCalendar::new();
        let now = cal.now();
        assert!(cal.is_valid_date(now.year, now.month, now.day));
    }
}
