//! Recurrence solver: next-occurrence computation over any civil calendar.
//!
//! The solver owns an immutable [`RecurrenceSpec`] and a calendar adapter
//! and resolves, for a given last-run instant, the earliest instant at
//! which the rule matches again. Minute and hour resolution are simple
//! ordered-set searches; the date part has to roll the day/month/year
//! cursor forward across irregular month lengths and leap-year rules while
//! honouring the compound day-of-month/month/weekday constraint.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::{trace, warn};

use crate::calendar::{CalendarSystem, CivilInstant};
use crate::error::{CoreError, Result};
use crate::models::{NextOccurrence, RecurrenceSpec};

/// Upper bound on cursor advances within one solve call. A spec whose
/// day/month/weekday sets have an empty intersection over valid calendar
/// dates would otherwise roll the year forward indefinitely.
const MAX_ROLLOVERS: u32 = 2000;

/// First value in `set` strictly greater than `value`.
fn first_after(set: &BTreeSet<u32>, value: u32) -> Option<u32> {
    set.range(value + 1..).next().copied()
}

/// Smallest value in `set`. Spec fields are validated non-empty at
/// construction.
fn minimum(set: &BTreeSet<u32>) -> u32 {
    set.iter().next().copied().unwrap_or_default()
}

/// Cursor the rollover loop advances: a candidate year plus indices into
/// the sorted month and day lists. Lives only for the duration of one
/// solve call.
struct RollState {
    year: i32,
    month_index: usize,
    day_index: usize,
    budget: u32,
}

impl RollState {
    fn consume(&mut self) -> Result<()> {
        if self.budget == 0 {
            warn!(
                cap = MAX_ROLLOVERS,
                "rollover budget exhausted; the day/month/weekday sets admit no valid date"
            );
            return Err(CoreError::RolloverExhausted);
        }
        self.budget -= 1;
        Ok(())
    }
}

/// Resolves the next due occurrence of a [`RecurrenceSpec`] in the calendar
/// system of its adapter.
///
/// Each solve is a pure function of its inputs; the only side effect is a
/// single wall-clock read when the caller does not supply "now" itself.
/// A solver over a reentrant adapter can be shared across threads freely.
#[derive(Debug)]
pub struct RecurrenceSolver<C: CalendarSystem> {
    spec: RecurrenceSpec,
    calendar: C,
}

impl<C: CalendarSystem> RecurrenceSolver<C> {
    pub fn new(spec: RecurrenceSpec, calendar: C) -> Self {
        Self { spec, calendar }
    }

    pub fn spec(&self) -> &RecurrenceSpec {
        &self.spec
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Next occurrence at or after `last_run`, using the adapter's clock
    /// for the "is the last run still today" check.
    pub fn next_occurrence(&self, last_run: &CivilInstant) -> Result<NextOccurrence> {
        let now = self.calendar.now();
        self.next_occurrence_after(last_run, &now)
    }

    /// Next occurrence at or after `last_run`, with a caller-supplied
    /// "now".
    ///
    /// Resolution narrows in three steps: a later allowed minute within
    /// `last_run`'s hour (only when that hour is still the current one), a
    /// later allowed hour within `last_run`'s date, and finally the date
    /// search. Fails with [`CoreError::InvalidDate`] when `last_run` does
    /// not name a real date, and [`CoreError::RolloverExhausted`] when the
    /// date search cannot converge.
    pub fn next_occurrence_after(
        &self,
        last_run: &CivilInstant,
        now: &CivilInstant,
    ) -> Result<NextOccurrence> {
        let weekday = self
            .calendar
            .day_of_week(last_run.year, last_run.month, last_run.day)?;
        let spec = &self.spec;

        let date_matches = spec.months_of_year().contains(&last_run.month)
            && spec.days_of_month().contains(&last_run.day)
            && spec.days_of_week().contains(&weekday);

        if date_matches && last_run.same_date(now) && spec.hours().contains(&last_run.hour) {
            if let Some(minute) = first_after(spec.minutes(), last_run.minute) {
                return Ok(NextOccurrence::new(
                    last_run.year,
                    last_run.month,
                    last_run.day,
                    last_run.hour,
                    minute,
                ));
            }
        }

        let next_minute = minimum(spec.minutes());
        if date_matches {
            if let Some(hour) = first_after(spec.hours(), last_run.hour) {
                return Ok(NextOccurrence::new(
                    last_run.year,
                    last_run.month,
                    last_run.day,
                    hour,
                    next_minute,
                ));
            }
        }

        let next_hour = minimum(spec.hours());
        if spec.days_of_month_unrestricted() && spec.months_unrestricted() {
            return self.next_allowed_weekday(last_run, weekday, next_hour, next_minute);
        }
        self.delta_to_next(last_run, next_hour, next_minute)
    }

    /// Date-part resolution: the first calendar-valid date after `last_run`
    /// whose month, day-of-month and weekday are all allowed, combined with
    /// the already-resolved hour and minute.
    ///
    /// Candidates are compared against the full `last_run` datetime, not
    /// just its date: the hour/minute phase has already established that no
    /// time remains within the last run's day, so its date must never be
    /// re-selected.
    pub fn delta_to_next(
        &self,
        last_run: &CivilInstant,
        next_hour: u32,
        next_minute: u32,
    ) -> Result<NextOccurrence> {
        let days: Vec<u32> = self.spec.days_of_month().iter().copied().collect();
        let months: Vec<u32> = self.spec.months_of_year().iter().copied().collect();

        let mut state = RollState {
            year: last_run.year,
            month_index: 0,
            day_index: 0,
            budget: MAX_ROLLOVERS,
        };

        if self.spec.months_of_year().contains(&last_run.month) {
            // Re-anchor to the current month with the day cursor strictly
            // past the last run's day.
            state.day_index = days.partition_point(|&day| day <= last_run.day);
            state.month_index = months.partition_point(|&month| month < last_run.month);
        } else {
            state.day_index = 0;
            state.month_index = months.partition_point(|&month| month <= last_run.month);
            if state.month_index == months.len() {
                // No later month this year; the rollover loop performs the
                // year increment once it sees the candidate precedes the
                // last run.
                state.month_index = 0;
            }
        }
        self.roll_over(&mut state, &days, &months, last_run)?;

        loop {
            let month = months[state.month_index];
            let day = days[state.day_index];
            let weekday = self.calendar.day_of_week(state.year, month, day)?;
            if self.spec.days_of_week().contains(&weekday) {
                trace!(
                    year = state.year,
                    month,
                    day,
                    "resolved next occurrence date"
                );
                return Ok(NextOccurrence::new(
                    state.year, month, day, next_hour, next_minute,
                ));
            }
            state.consume()?;
            state.day_index += 1;
            self.roll_over(&mut state, &days, &months, last_run)?;
        }
    }

    /// Normalizes the cursor: advances month (and year) until it points at
    /// a calendar-valid date that is not before `last_run`.
    fn roll_over(
        &self,
        state: &mut RollState,
        days: &[u32],
        months: &[u32],
        last_run: &CivilInstant,
    ) -> Result<()> {
        loop {
            let needs_advance = state.day_index == days.len() || {
                let month = months[state.month_index];
                let day = days[state.day_index];
                !self.calendar.is_valid_date(state.year, month, day)
                    || CivilInstant::from_date(state.year, month, day).cmp_fields(last_run)
                        == Ordering::Less
            };
            if !needs_advance {
                return Ok(());
            }
            state.consume()?;
            state.day_index = 0;
            state.month_index += 1;
            if state.month_index == months.len() {
                state.month_index = 0;
                state.year += 1;
            }
        }
    }

    /// Fast path for specs whose day-of-month and month sets are both
    /// unrestricted: the next date is pure weekday arithmetic, stepped in
    /// civil days through the adapter.
    fn next_allowed_weekday(
        &self,
        last_run: &CivilInstant,
        weekday: u32,
        next_hour: u32,
        next_minute: u32,
    ) -> Result<NextOccurrence> {
        let target = first_after(self.spec.days_of_week(), weekday)
            .unwrap_or_else(|| minimum(self.spec.days_of_week()));
        let mut days_ahead = (target + 7 - weekday) % 7;
        if days_ahead == 0 {
            // Wrapping back onto the same weekday means a full week out.
            days_ahead = 7;
        }

        let (mut year, mut month, mut day) = (last_run.year, last_run.month, last_run.day);
        for _ in 0..days_ahead {
            day += 1;
            let len = self
                .calendar
                .days_in_month(year, month)
                .ok_or(CoreError::InvalidDate { year, month, day })?;
            if day > len {
                day = 1;
                month += 1;
                if month > 12 {
                    month = 1;
                    year += 1;
                }
            }
        }
        Ok(NextOccurrence::new(year, month, day, next_hour, next_minute))
    }

    /// Time until the next occurrence, measured against the adapter's
    /// clock, for a last run persisted as a universal instant. Negative
    /// means the schedule is overdue.
    pub fn remaining_estimate(
        &self,
        last_run: chrono::DateTime<chrono::Utc>,
    ) -> Result<chrono::Duration> {
        let now_universal = chrono::Utc::now();
        let now_civil = self.calendar.from_universal(now_universal);
        let last_run_civil = self.calendar.from_universal(last_run);
        let next = self.next_occurrence_after(&last_run_civil, &now_civil)?;
        let due = self.calendar.to_universal(&next.into_instant(&self.calendar)?)?;
        Ok(due - now_universal)
    }
}
