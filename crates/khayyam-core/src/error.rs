use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid date: year {year}, month {month}, day {day} does not exist in this calendar")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Unable to roll over: time specification never matches a valid calendar date")]
    RolloverExhausted,

    #[error("Invalid recurrence spec: {0}")]
    InvalidSpec(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
