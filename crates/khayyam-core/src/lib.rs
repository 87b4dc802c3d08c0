//! # Khayyam Core Library
//!
//! A cron-style recurrence solver that works over pluggable civil
//! calendars, including the Jalali (Solar Hijri) calendar with its
//! variable month lengths and 33-year leap cycle.
//!
//! ## Features
//!
//! - **Compound Cron Rules**: minute, hour, day-of-month, month and
//!   weekday sets resolved together, including specs where the three date
//!   constraints interact (day 30 of a short month, weekday-forced month
//!   rollovers)
//! - **Calendar Agnostic**: the solver only talks to the
//!   [`calendar::CalendarSystem`] interface; Jalali and Gregorian adapters
//!   ship in-tree and further calendars plug in without touching the
//!   algorithm
//! - **Guaranteed Termination**: contradictory rules (day 31 in months
//!   that never have one) fail with
//!   [`error::CoreError::RolloverExhausted`] instead of spinning
//! - **Timezone Aware**: adapters optionally attach an IANA zone and
//!   convert to and from universal instants for interop with a host
//!   scheduler's persisted timestamps
//!
//! ## Core Modules
//!
//! - [`models`]: the recurrence spec and next-occurrence value types
//! - [`calendar`]: the adapter interface plus the Jalali and Gregorian
//!   implementations
//! - [`recurrence`]: the rollover solver
//! - [`timezone`]: IANA zone helpers
//! - [`error`]: error types
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use khayyam_core::{
//!     calendar::{CalendarSystem, PersianCalendar},
//!     models::{RecurrenceSpec, DAYS_OF_WEEK},
//!     recurrence::RecurrenceSolver,
//! };
//!
//! fn main() -> Result<(), khayyam_core::error::CoreError> {
//!     // 06:30 on the first day of Farvardin and Mehr.
//!     let spec = RecurrenceSpec::new(
//!         BTreeSet::from([30]),
//!         BTreeSet::from([6]),
//!         BTreeSet::from([1]),
//!         BTreeSet::from([1, 7]),
//!         DAYS_OF_WEEK.collect(),
//!     )?;
//!
//!     let calendar = PersianCalendar::with_timezone_name("Asia/Tehran")?;
//!     let solver = RecurrenceSolver::new(spec, calendar);
//!
//!     let last_run = solver.calendar().now();
//!     let next = solver.next_occurrence(&last_run)?;
//!     println!("next run: {}-{:02}-{:02} {:02}:{:02}",
//!         next.year, next.month, next.day, next.hour, next.minute);
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod timezone;

pub use calendar::{CalendarSystem, CivilInstant, GregorianCalendar, PersianCalendar};
pub use error::{CoreError, Result};
pub use models::{NextOccurrence, RecurrenceSpec};
pub use recurrence::RecurrenceSolver;
