//! Error types for duke-calc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the calendar helpers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Day, month and year do not form a calendar date
    #[error("Invalid date: year {year}, month {month}, day {day}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// Hour, minute and second do not form a time of day
    #[error("Invalid time: {hour}:{minute}:{second}")]
    InvalidTime { hour: u32, minute: u32, second: u32 },

    /// Hour bucket cannot be represented as an instant
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(f64),

    /// Text does not match the date pattern
    #[error("Cannot parse '{text}' with pattern '{pattern}'")]
    UnparsableDate { text: String, pattern: String },
}
