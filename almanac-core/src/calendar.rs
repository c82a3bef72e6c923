//! Calendar normalization
//!
//! [`Calendar`] is the calendar context an [`Instant`] is read in: a fixed
//! offset from UTC. It converts instants to broken-down [`CalendarFields`]
//! and back, and owns the overflow policy for calendar arithmetic:
//!
//! - `compose` and `replace` validate: day 31 in a 30-day month is an error.
//! - `add_months` and `add_years` roll forward: the surplus days of an
//!   impossible day-of-month spill into the following month, so
//!   2023-01-31 plus one month is 2023-03-03, not 2023-02-28.
//! - linear shifts (days and smaller) never look at fields at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::civil::{self, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::config;
use crate::error::{CalendarError, Result};
use crate::instant::Instant;

// ============================================================================
// Offset
// ============================================================================

/// A fixed offset from UTC, in seconds east of Greenwich
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct Offset {
    seconds: i32,
}

impl Offset {
    pub const UTC: Offset = Offset { seconds: 0 };

    /// Largest magnitude an offset may have (23:59:59)
    pub const MAX_SECONDS: i32 = 86_399;

    /// Create an offset from seconds east of UTC
    pub fn from_seconds(seconds: i32) -> Result<Self> {
        if seconds.unsigned_abs() > Self::MAX_SECONDS as u32 {
            return Err(CalendarError::InvalidOffset(format!(
                "{} seconds exceeds ±23:59:59",
                seconds
            )));
        }
        Ok(Self { seconds })
    }

    /// Create an offset from whole hours east of UTC
    pub fn from_hours(hours: i32) -> Result<Self> {
        let seconds = hours
            .checked_mul(SECONDS_PER_HOUR as i32)
            .ok_or_else(|| CalendarError::InvalidOffset(format!("{} hours", hours)))?;
        Self::from_seconds(seconds)
    }

    /// Seconds east of UTC
    pub fn seconds(self) -> i32 {
        self.seconds
    }

    pub fn is_utc(self) -> bool {
        self.seconds == 0
    }

    /// Split into sign, hours, minutes, seconds of the magnitude
    pub(crate) fn parts(self) -> (char, u32, u32, u32) {
        let sign = if self.seconds < 0 { '-' } else { '+' };
        let abs = self.seconds.unsigned_abs();
        (sign, abs / 3600, (abs % 3600) / 60, abs % 60)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, hours, minutes, seconds) = self.parts();
        write!(f, "{}{:02}:{:02}", sign, hours, minutes)?;
        if seconds != 0 {
            write!(f, ":{:02}", seconds)?;
        }
        Ok(())
    }
}

impl TryFrom<i32> for Offset {
    type Error = CalendarError;

    fn try_from(seconds: i32) -> Result<Self> {
        Self::from_seconds(seconds)
    }
}

impl From<Offset> for i32 {
    fn from(offset: Offset) -> Self {
        offset.seconds
    }
}

impl FromStr for Offset {
    type Err = CalendarError;

    /// Accepts `Z`, `UTC`, `+HH`, `+HHMM`, `+HH:MM` and `+HH:MM:SS`
    /// (and the `-` forms).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Ok(Self::UTC);
        }

        let (negative, rest) = match s.as_bytes().first() {
            Some(b'+') => (false, &s[1..]),
            Some(b'-') => (true, &s[1..]),
            _ => {
                return Err(CalendarError::parse(format!(
                    "offset '{}' must start with + or -",
                    s
                )))
            }
        };

        // ASCII only from here, so byte slicing below stays on char boundaries
        if !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
            return Err(CalendarError::parse(format!("malformed offset '{}'", s)));
        }
        let parts: Vec<&str> = if rest.contains(':') {
            rest.split(':').collect()
        } else if rest.len() == 4 {
            vec![&rest[..2], &rest[2..]]
        } else {
            vec![rest]
        };
        if parts.len() > 3 || parts.iter().any(|p| p.len() != 2) {
            return Err(CalendarError::parse(format!("malformed offset '{}'", s)));
        }

        let mut units = [0i32; 3];
        for (unit, part) in units.iter_mut().zip(&parts) {
            *unit = part
                .parse()
                .map_err(|_| CalendarError::parse(format!("malformed offset '{}'", s)))?;
        }
        let [hours, minutes, seconds] = units;
        if minutes > 59 || seconds > 59 {
            return Err(CalendarError::InvalidOffset(s.to_string()));
        }

        let total = hours * 3600 + minutes * 60 + seconds;
        Self::from_seconds(if negative { -total } else { total })
    }
}

// ============================================================================
// CalendarFields
// ============================================================================

/// Broken-down civil date and time
///
/// Fields are plain data; [`CalendarFields::validate`] checks them against
/// the Gregorian rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CalendarFields {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self { year, month, day, hour, minute, second }
    }

    /// A date at midnight
    pub fn date(year: i32, month: u32, day: u32) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Check every field against its natural range, including the
    /// leap-year-aware length of the month
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(CalendarError::InvalidMonth(self.month));
        }
        if self.day < 1 || self.day > civil::days_in_month(self.year, self.month) {
            return Err(CalendarError::InvalidDay {
                year: self.year,
                month: self.month,
                day: self.day,
            });
        }
        if self.hour > 23 {
            return Err(CalendarError::InvalidHour(self.hour));
        }
        if self.minute > 59 {
            return Err(CalendarError::InvalidMinute(self.minute));
        }
        if self.second > 59 {
            return Err(CalendarError::InvalidSecond(self.second));
        }
        Ok(())
    }

    /// Day of week, 0=Sunday..6=Saturday
    pub fn weekday(&self) -> u32 {
        civil::weekday_from_days(civil::days_from_civil(self.year, self.month, self.day))
    }

    /// Day of year (1-366)
    pub fn day_of_year(&self) -> u32 {
        civil::day_of_year(self.year, self.month, self.day)
    }

    /// Hour on a 12-hour clock (1-12)
    pub fn hour12(&self) -> u32 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }

    pub fn is_pm(&self) -> bool {
        self.hour >= 12
    }

    fn seconds_of_day(&self) -> i64 {
        i64::from(self.hour) * SECONDS_PER_HOUR
            + i64::from(self.minute) * SECONDS_PER_MINUTE
            + i64::from(self.second)
    }
}

// ============================================================================
// FieldOverrides
// ============================================================================

/// Fields to overwrite in [`Calendar::replace`]
///
/// A field left as `None` keeps its current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldOverrides {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
}

impl FieldOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn with_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn with_minute(mut self, minute: u32) -> Self {
        self.minute = Some(minute);
        self
    }

    pub fn with_second(mut self, second: u32) -> Self {
        self.second = Some(second);
        self
    }

    /// Set the time of day in one go
    pub fn with_time(self, hour: u32, minute: u32, second: u32) -> Self {
        self.with_hour(hour).with_minute(minute).with_second(second)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, fields: CalendarFields) -> CalendarFields {
        CalendarFields {
            year: self.year.unwrap_or(fields.year),
            month: self.month.unwrap_or(fields.month),
            day: self.day.unwrap_or(fields.day),
            hour: self.hour.unwrap_or(fields.hour),
            minute: self.minute.unwrap_or(fields.minute),
            second: self.second.unwrap_or(fields.second),
        }
    }
}

// ============================================================================
// Calendar
// ============================================================================

/// The calendar context instants are decomposed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Calendar {
    offset: Offset,
}

impl Calendar {
    pub const UTC: Calendar = Calendar { offset: Offset::UTC };

    pub fn utc() -> Self {
        Self::UTC
    }

    pub fn fixed(offset: Offset) -> Self {
        Self { offset }
    }

    /// The process-wide local calendar, configured through the
    /// `ALMANAC_UTC_OFFSET` environment variable (UTC when unset)
    pub fn local() -> Self {
        config::local_calendar()
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    fn local_seconds(&self, instant: Instant) -> i64 {
        instant.epoch_seconds() + i64::from(self.offset.seconds())
    }

    fn from_local_seconds(&self, local: i64) -> i64 {
        local - i64::from(self.offset.seconds())
    }

    // ========== Conversion ==========

    /// Break an instant into civil fields. Always succeeds.
    pub fn decompose(&self, instant: Instant) -> CalendarFields {
        let local = self.local_seconds(instant);
        let days = local.div_euclid(SECONDS_PER_DAY);
        let secs = local.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = civil::civil_from_days(days);
        CalendarFields {
            year,
            month,
            day,
            hour: (secs / SECONDS_PER_HOUR) as u32,
            minute: ((secs % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u32,
            second: (secs % SECONDS_PER_MINUTE) as u32,
        }
    }

    /// Build the instant whose decomposition is `fields`
    pub fn compose(&self, fields: &CalendarFields) -> Result<Instant> {
        fields.validate()?;
        let days = civil::days_from_civil(fields.year, fields.month, fields.day);
        let secs = self.from_local_seconds(days * SECONDS_PER_DAY + fields.seconds_of_day());
        if !(Instant::MIN_EPOCH_SECONDS..=Instant::MAX_EPOCH_SECONDS).contains(&secs) {
            return Err(CalendarError::OutOfRange(fields.year));
        }
        Ok(Instant::from_parts(secs, *self))
    }

    // ========== Arithmetic ==========

    /// Shift by whole months, rolling an impossible day forward
    ///
    /// The time of day is kept. Results past the supported range saturate
    /// at [`Instant::MIN`] / [`Instant::MAX`].
    pub fn add_months(&self, instant: Instant, months: i64) -> Instant {
        let fields = self.decompose(instant);
        let total = i64::from(fields.year)
            .saturating_mul(12)
            .saturating_add(i64::from(fields.month) - 1)
            .saturating_add(months);
        let year = total.div_euclid(12);
        let month = (total.rem_euclid(12) + 1) as u32;

        // Far enough out that the result saturates whatever the day and offset
        if year < i64::from(civil::MIN_YEAR) - 1 {
            return Instant::MIN.with_calendar(*self);
        }
        if year > i64::from(civil::MAX_YEAR) + 1 {
            return Instant::MAX.with_calendar(*self);
        }
        let year = year as i32;

        let max_day = civil::days_in_month(year, month);
        if fields.day > max_day {
            tracing::trace!(
                year,
                month,
                day = fields.day,
                overflow = fields.day - max_day,
                "day past end of month rolled forward"
            );
        }

        // Day 1 of the target month plus the day-of-month offset; days past
        // the month's end carry into the next month
        let days = civil::days_from_civil(year, month, 1) + i64::from(fields.day) - 1;
        let local = days * SECONDS_PER_DAY + fields.seconds_of_day();
        Instant::saturating(self.from_local_seconds(local), *self)
    }

    /// Shift by whole years, with the same roll-forward as [`add_months`]:
    /// February 29 plus one year is March 1.
    ///
    /// [`add_months`]: Calendar::add_months
    pub fn add_years(&self, instant: Instant, years: i64) -> Instant {
        self.add_months(instant, years.saturating_mul(12))
    }

    /// Overwrite the given fields and compose again. Unlike month
    /// arithmetic this validates, so `day = 31` in a 30-day month fails.
    pub fn replace(&self, instant: Instant, overrides: &FieldOverrides) -> Result<Instant> {
        let fields = overrides.apply(self.decompose(instant));
        self.compose(&fields)
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset.is_utc() {
            write!(f, "UTC")
        } else {
            write!(f, "UTC{}", self.offset)
        }
    }
}
