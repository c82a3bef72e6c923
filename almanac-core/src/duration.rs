//! Signed spans of time
//!
//! A [`Duration`] is a whole number of seconds, positive or negative, with
//! no calendar attached. Day/second decomposition truncates toward zero:
//! `days() * 86400 + seconds() == total_seconds()` for every value, and
//! both parts carry the sign of the total.
//!
//! Construction and arithmetic saturate at the `i64` bounds instead of
//! overflowing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::civil::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::error::{CalendarError, Result};

/// A signed duration with second precision
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Duration {
    secs: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration { secs: 0 };

    // ========== Construction ==========

    /// Create from seconds
    pub const fn from_secs(secs: i64) -> Self {
        Self { secs }
    }

    /// Sum days, hours, minutes and seconds into one span.
    ///
    /// Components may have mixed signs: `(1, -2, 0, 0)` is 22 hours.
    pub fn from_components(days: i64, hours: i64, minutes: i64, seconds: i64) -> Self {
        let secs = days
            .saturating_mul(SECONDS_PER_DAY)
            .saturating_add(hours.saturating_mul(SECONDS_PER_HOUR))
            .saturating_add(minutes.saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(seconds);
        Self { secs }
    }

    pub const fn from_days(days: i64) -> Self {
        Self { secs: days.saturating_mul(SECONDS_PER_DAY) }
    }

    pub const fn from_hours(hours: i64) -> Self {
        Self { secs: hours.saturating_mul(SECONDS_PER_HOUR) }
    }

    pub const fn from_minutes(minutes: i64) -> Self {
        Self { secs: minutes.saturating_mul(SECONDS_PER_MINUTE) }
    }

    pub const fn zero() -> Self {
        Self::ZERO
    }

    // ========== Accessors ==========

    /// Total seconds, the canonical value
    pub const fn total_seconds(&self) -> i64 {
        self.secs
    }

    /// Whole days, truncated toward zero
    pub const fn days(&self) -> i64 {
        self.secs / SECONDS_PER_DAY
    }

    /// Seconds left over after [`days`](Duration::days), with the sign of
    /// the total (-86399..=86399)
    pub const fn seconds(&self) -> i64 {
        self.secs % SECONDS_PER_DAY
    }

    /// Get total hours (truncated)
    pub const fn as_hours(&self) -> i64 {
        self.secs / SECONDS_PER_HOUR
    }

    /// Get total minutes (truncated)
    pub const fn as_minutes(&self) -> i64 {
        self.secs / SECONDS_PER_MINUTE
    }

    pub const fn is_zero(&self) -> bool {
        self.secs == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.secs < 0
    }

    pub fn abs(&self) -> Self {
        Self { secs: self.secs.saturating_abs() }
    }

    // ========== Arithmetic ==========

    /// Integer division of the total, truncating toward zero
    pub fn checked_div(&self, divisor: i64) -> Result<Self> {
        if divisor == 0 {
            return Err(CalendarError::DivisionByZero);
        }
        Ok(Self { secs: self.secs.saturating_div(divisor) })
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration { secs: self.secs.saturating_add(rhs.secs) }
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration { secs: self.secs.saturating_sub(rhs.secs) }
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.secs = self.secs.saturating_add(rhs.secs);
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Duration) {
        self.secs = self.secs.saturating_sub(rhs.secs);
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration { secs: self.secs.saturating_neg() }
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Duration {
        Duration { secs: self.secs.saturating_mul(rhs) }
    }
}

impl Div<i64> for Duration {
    type Output = Duration;

    /// # Panics
    ///
    /// Panics when `rhs` is zero. Use [`Duration::checked_div`] to get an
    /// error instead.
    fn div(self, rhs: i64) -> Duration {
        match self.checked_div(rhs) {
            Ok(d) => d,
            Err(_) => panic!("attempt to divide a duration by zero"),
        }
    }
}

impl From<Duration> for i64 {
    fn from(d: Duration) -> Self {
        d.secs
    }
}

impl fmt::Display for Duration {
    /// `D day(s), HH:MM:SS`, with the day part only when non-zero.
    /// Negative spans get a leading `-` on the magnitude: `-1 day, 02:00:00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.secs.unsigned_abs();
        let sign = if self.secs < 0 { "-" } else { "" };

        let day = SECONDS_PER_DAY as u64;
        let days = abs / day;
        let hours = (abs % day) / SECONDS_PER_HOUR as u64;
        let minutes = (abs % SECONDS_PER_HOUR as u64) / SECONDS_PER_MINUTE as u64;
        let seconds = abs % SECONDS_PER_MINUTE as u64;

        write!(f, "{}", sign)?;
        if days != 0 {
            write!(f, "{} day{}, ", days, if days == 1 { "" } else { "s" })?;
        }
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Render a duration for reports; same text as `Display`
pub fn format_duration(duration: &Duration) -> String {
    duration.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_components() {
        assert_eq!(Duration::from_components(1, 0, 0, 0).total_seconds(), 86_400);
        assert_eq!(Duration::from_components(0, 2, 30, 45).total_seconds(), 9045);
        assert_eq!(Duration::from_components(1, -2, 0, 0), Duration::from_hours(22));
        assert_eq!(Duration::from_days(7), Duration::from_components(7, 0, 0, 0));
        assert_eq!(Duration::from_minutes(90).as_hours(), 1);
    }

    #[test]
    fn test_decomposition() {
        let d = Duration::from_components(2, 3, 4, 5);
        assert_eq!(d.days(), 2);
        assert_eq!(d.seconds(), 3 * 3600 + 4 * 60 + 5);
    }

    #[test]
    fn test_negative_decomposition_truncates_toward_zero() {
        let d = Duration::from_hours(-26);
        assert_eq!(d.days(), -1);
        assert_eq!(d.seconds(), -2 * 3600);
        assert_eq!(d.days() * 86_400 + d.seconds(), d.total_seconds());

        let d = Duration::from_hours(-5);
        assert_eq!(d.days(), 0);
        assert_eq!(d.seconds(), -5 * 3600);
    }

    #[test]
    fn test_arithmetic() {
        let a = Duration::from_days(5);
        let b = Duration::from_hours(12);
        assert_eq!((a + b).as_hours(), 5 * 24 + 12);
        assert_eq!((a - b).as_hours(), 5 * 24 - 12);
        assert_eq!((b * 3).as_hours(), 36);
        assert_eq!((a / 2).total_seconds(), 216_000);
        assert_eq!(-b, Duration::from_hours(-12));

        let mut c = a;
        c += b;
        c -= a;
        assert_eq!(c, b);
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!((Duration::from_secs(7) / 2).total_seconds(), 3);
        assert_eq!((Duration::from_secs(-7) / 2).total_seconds(), -3);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Duration::from_secs(i64::MAX);
        let min = Duration::from_secs(i64::MIN);
        let one = Duration::from_secs(1);

        assert_eq!(max + one, max);
        assert_eq!(min - one, min);
        assert_eq!(min + one, Duration::from_secs(i64::MIN + 1));
        assert_eq!(-min, max);
        assert_eq!(max * 2, max);
        assert_eq!(max * -2, min);

        let mut d = max;
        d += one;
        assert_eq!(d, max);
        d = min;
        d -= one;
        assert_eq!(d, min);
    }

    #[test]
    fn test_from_components_saturates() {
        let max = Duration::from_secs(i64::MAX);
        let min = Duration::from_secs(i64::MIN);
        assert_eq!(Duration::from_components(i64::MAX / 1000, 0, 0, 0), max);
        assert_eq!(Duration::from_components(1, 0, 0, i64::MAX), max);
        assert_eq!(Duration::from_components(i64::MIN, -1, 0, 0), min);
        assert_eq!(Duration::from_days(i64::MAX), max);
        assert_eq!(Duration::from_minutes(i64::MIN), min);
    }

    #[test]
    fn test_division_by_zero() {
        let err = Duration::from_secs(10).checked_div(0).unwrap_err();
        assert_eq!(err, CalendarError::DivisionByZero);
    }

    #[test]
    #[should_panic(expected = "divide a duration by zero")]
    fn test_division_operator_by_zero_panics() {
        let _ = Duration::from_secs(10) / 0;
    }

    #[test]
    fn test_ordering() {
        assert!(Duration::from_hours(1) > Duration::from_minutes(59));
        assert!(Duration::from_secs(-1) < Duration::ZERO);
        assert!(Duration::zero().is_zero());
        assert!(Duration::from_secs(-1).is_negative());
        assert_eq!(Duration::from_secs(-90).abs(), Duration::from_secs(90));
    }

    #[test]
    fn test_display() {
        assert_eq!(Duration::from_components(0, 2, 30, 45).to_string(), "02:30:45");
        assert_eq!(Duration::from_components(1, 0, 0, 0).to_string(), "1 day, 00:00:00");
        assert_eq!(Duration::from_components(3, 0, 0, 0).to_string(), "3 days, 00:00:00");
        assert_eq!(Duration::from_components(2, 1, 2, 3).to_string(), "2 days, 01:02:03");
        assert_eq!(Duration::ZERO.to_string(), "00:00:00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Duration::from_hours(-26).to_string(), "-1 day, 02:00:00");
        assert_eq!(Duration::from_minutes(-90).to_string(), "-01:30:00");
    }

    #[test]
    fn test_format_duration() {
        let d = Duration::from_components(3, 4, 5, 6);
        assert_eq!(format_duration(&d), d.to_string());
    }

    #[test]
    fn test_serde_transparent() {
        let d = Duration::from_hours(2);
        assert_eq!(serde_json::to_string(&d).unwrap(), "7200");
        let back: Duration = serde_json::from_str("-30").unwrap();
        assert_eq!(back, Duration::from_secs(-30));
    }
}
