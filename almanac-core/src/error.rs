//! Calendar errors
//!
//! Every failure is a value. Construction, replacement and parsing report
//! impossible dates as `InvalidCalendarField`-kind errors, malformed text as
//! `ParseError`-kind errors, and a zero divisor as `DivisionByZero`.

use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_DATE: &str = "INVALID_DATE";
    pub const INVALID_TIME: &str = "INVALID_TIME";
    pub const INVALID_OFFSET: &str = "INVALID_OFFSET";
    pub const DATE_OVERFLOW: &str = "DATE_OVERFLOW";
    pub const DATE_PARSE_ERROR: &str = "DATE_PARSE_ERROR";
    pub const DIV_ZERO: &str = "DIV_ZERO";
}

/// Broad category of a [`CalendarError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The fields denote an impossible date or an out-of-range time component
    InvalidCalendarField,
    /// The input text does not have the shape the format asks for
    ParseError,
    /// A duration was divided by zero
    DivisionByZero,
}

/// Errors that can occur with calendar operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("Invalid month: {0} (must be 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid day: {day} for {year}-{month:02}")]
    InvalidDay { year: i32, month: u32, day: u32 },

    #[error("Invalid hour: {0} (must be 0-23)")]
    InvalidHour(u32),

    #[error("Invalid minute: {0} (must be 0-59)")]
    InvalidMinute(u32),

    #[error("Invalid second: {0} (must be 0-59)")]
    InvalidSecond(u32),

    #[error("Year {0} is outside the supported range")]
    OutOfRange(i32),

    #[error("Invalid UTC offset: {0}")]
    InvalidOffset(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Division by zero")]
    DivisionByZero,
}

impl CalendarError {
    pub(crate) fn parse(details: impl Into<String>) -> Self {
        Self::Parse(details.into())
    }

    /// The category this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::ParseError,
            Self::DivisionByZero => ErrorKind::DivisionByZero,
            _ => ErrorKind::InvalidCalendarField,
        }
    }

    /// Machine-readable error code, one of [`codes`]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMonth(_) | Self::InvalidDay { .. } => codes::INVALID_DATE,
            Self::InvalidHour(_) | Self::InvalidMinute(_) | Self::InvalidSecond(_) => {
                codes::INVALID_TIME
            }
            Self::OutOfRange(_) => codes::DATE_OVERFLOW,
            Self::InvalidOffset(_) => codes::INVALID_OFFSET,
            Self::Parse(_) => codes::DATE_PARSE_ERROR,
            Self::DivisionByZero => codes::DIV_ZERO,
        }
    }

    /// Suggestion for fixing the error
    pub fn suggestion(&self) -> &'static str {
        match self.code() {
            codes::INVALID_DATE => "Check date components (year, month 1-12, day 1-31)",
            codes::INVALID_TIME => "Check time components (hour 0-23, minute 0-59, second 0-59)",
            codes::DATE_OVERFLOW => "Use a year between -9999 and 9999",
            codes::INVALID_OFFSET => "Use an offset such as Z, +08:00 or -0530",
            codes::DIV_ZERO => "Ensure divisor is not zero",
            _ => "Check that the text matches the format specifiers",
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = CalendarError> = std::result::Result<T, E>;
