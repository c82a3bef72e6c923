//! Almanac Core - Civil calendar time
//!
//! This crate provides second-precision calendar types:
//! - `Instant`: A point in time read through a `Calendar`
//! - `Duration`: A signed span of seconds
//! - `Calendar`: Field decomposition, validated composition and month arithmetic
//! - `CalendarError`: Structured errors with stable codes
//!
//! Instants format and parse with strftime-style directives (`%Y-%m-%d`).

pub mod civil;
mod calendar;
mod config;
mod duration;
mod error;
mod format;
mod instant;

pub use calendar::{Calendar, CalendarFields, FieldOverrides, Offset};
pub use civil::{days_in_month, is_leap_year};
pub use config::UTC_OFFSET_ENV;
pub use duration::{format_duration, Duration};
pub use error::{codes, CalendarError, ErrorKind, Result};
pub use format::{DEFAULT_FORMAT, ISO_FORMAT, RFC3339_FORMAT};
pub use instant::Instant;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Calendar, CalendarError, Duration, FieldOverrides, Instant, Offset};
    pub use crate::error::codes;
}
