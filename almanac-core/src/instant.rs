//! Points on the time axis
//!
//! An [`Instant`] is a count of seconds since 1970-01-01T00:00:00Z plus the
//! [`Calendar`] it is read in. The seconds are the only source of truth:
//! equality, ordering and hashing ignore the calendar, and every calendar
//! field is derived on demand.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::calendar::{Calendar, CalendarFields, FieldOverrides};
use crate::civil::{self, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::duration::Duration;
use crate::error::Result;
use crate::format;

#[derive(Debug, Clone, Copy)]
pub struct Instant {
    /// Seconds since Unix epoch (negative for pre-1970)
    secs: i64,
    calendar: Calendar,
}

impl Instant {
    /// Epoch seconds of -9999-01-01T00:00:00Z
    pub const MIN_EPOCH_SECONDS: i64 =
        civil::days_from_civil(civil::MIN_YEAR, 1, 1) * SECONDS_PER_DAY;
    /// Epoch seconds of 9999-12-31T23:59:59Z
    pub const MAX_EPOCH_SECONDS: i64 =
        civil::days_from_civil(civil::MAX_YEAR, 12, 31) * SECONDS_PER_DAY + SECONDS_PER_DAY - 1;

    pub const MIN: Instant = Instant { secs: Self::MIN_EPOCH_SECONDS, calendar: Calendar::UTC };
    pub const MAX: Instant = Instant { secs: Self::MAX_EPOCH_SECONDS, calendar: Calendar::UTC };

    pub(crate) const fn from_parts(secs: i64, calendar: Calendar) -> Self {
        Self { secs, calendar }
    }

    /// Clamp into the supported range
    pub(crate) fn saturating(secs: i64, calendar: Calendar) -> Self {
        Self {
            secs: secs.clamp(Self::MIN_EPOCH_SECONDS, Self::MAX_EPOCH_SECONDS),
            calendar,
        }
    }

    // ========== Construction ==========

    /// Current time in the local calendar
    pub fn now() -> Self {
        Self::now_in(Calendar::local())
    }

    /// Current time in the given calendar
    pub fn now_in(calendar: Calendar) -> Self {
        let secs = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_secs()).unwrap_or(i64::MAX),
            // Clock set before 1970; round toward the past like the positive side
            Err(err) => {
                let before = err.duration();
                let whole = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
                if before.subsec_nanos() > 0 {
                    whole.saturating_neg().saturating_sub(1)
                } else {
                    whole.saturating_neg()
                }
            }
        };
        Self::saturating(secs, calendar)
    }

    /// Create from calendar fields in the local calendar
    pub fn from_fields(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self> {
        let fields = CalendarFields::new(year, month, day, hour, minute, second);
        Self::from_fields_in(Calendar::local(), &fields)
    }

    /// Create a date (time = 00:00:00) in the local calendar
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        Self::from_fields(year, month, day, 0, 0, 0)
    }

    /// Create from calendar fields in the given calendar
    pub fn from_fields_in(calendar: Calendar, fields: &CalendarFields) -> Result<Self> {
        calendar.compose(fields)
    }

    /// Create from seconds since the Unix epoch, in the local calendar.
    /// Values past the supported range saturate at [`Instant::MIN`] /
    /// [`Instant::MAX`].
    pub fn from_epoch_seconds(secs: i64) -> Self {
        Self::from_epoch_seconds_in(Calendar::local(), secs)
    }

    pub fn from_epoch_seconds_in(calendar: Calendar, secs: i64) -> Self {
        Self::saturating(secs, calendar)
    }

    /// Parse `"%Y-%m-%d %H:%M:%S"` text in the local calendar
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, format::DEFAULT_FORMAT)
    }

    /// Parse text with a strftime-style format in the local calendar
    pub fn parse_with(text: &str, spec: &str) -> Result<Self> {
        Self::parse_in(Calendar::local(), text, spec)
    }

    /// Parse text with a strftime-style format. A `%z` in the format
    /// overrides `calendar`.
    pub fn parse_in(calendar: Calendar, text: &str, spec: &str) -> Result<Self> {
        format::parse(calendar, text, spec)
    }

    // ========== Accessors ==========

    /// Get seconds since Unix epoch
    pub fn epoch_seconds(&self) -> i64 {
        self.secs
    }

    /// Get milliseconds since Unix epoch
    pub fn epoch_millis(&self) -> i64 {
        self.secs * 1000
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// The same instant read in another calendar
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Decompose into all fields at once
    pub fn fields(&self) -> CalendarFields {
        self.calendar.decompose(*self)
    }

    pub fn year(&self) -> i32 {
        self.fields().year
    }

    /// Get month component (1-12)
    pub fn month(&self) -> u32 {
        self.fields().month
    }

    /// Get day component (1-31)
    pub fn day(&self) -> u32 {
        self.fields().day
    }

    /// Get hour component (0-23)
    pub fn hour(&self) -> u32 {
        self.fields().hour
    }

    /// Get minute component (0-59)
    pub fn minute(&self) -> u32 {
        self.fields().minute
    }

    /// Get second component (0-59)
    pub fn second(&self) -> u32 {
        self.fields().second
    }

    /// Get day of week (0=Sunday, 6=Saturday)
    pub fn weekday(&self) -> u32 {
        self.fields().weekday()
    }

    /// Get day of year (1-366)
    pub fn day_of_year(&self) -> u32 {
        self.fields().day_of_year()
    }

    // ========== Formatting ==========

    /// Render with a strftime-style format
    pub fn format(&self, spec: &str) -> String {
        format::format(self, spec)
    }

    pub fn strftime(&self, spec: &str) -> String {
        self.format(spec)
    }

    /// `YYYY-MM-DDThh:mm:ss`
    pub fn isoformat(&self) -> String {
        self.format(format::ISO_FORMAT)
    }

    /// `YYYY-MM-DD hh:mm:ss`
    pub fn to_default_string(&self) -> String {
        self.format(format::DEFAULT_FORMAT)
    }

    // ========== Arithmetic ==========

    /// Add years, rolling February 29 forward to March 1 in common years
    pub fn add_years(&self, years: i64) -> Self {
        self.calendar.add_years(*self, years)
    }

    /// Add months, rolling an impossible day forward into the next month
    pub fn add_months(&self, months: i64) -> Self {
        self.calendar.add_months(*self, months)
    }

    pub fn add_days(&self, days: i64) -> Self {
        self.shift(days, SECONDS_PER_DAY)
    }

    pub fn add_hours(&self, hours: i64) -> Self {
        self.shift(hours, SECONDS_PER_HOUR)
    }

    pub fn add_minutes(&self, minutes: i64) -> Self {
        self.shift(minutes, SECONDS_PER_MINUTE)
    }

    pub fn add_seconds(&self, seconds: i64) -> Self {
        self.shift(seconds, 1)
    }

    fn shift(&self, n: i64, unit: i64) -> Self {
        Self::saturating(self.secs.saturating_add(n.saturating_mul(unit)), self.calendar)
    }

    /// Overwrite some fields; fails if the result is not a real date
    pub fn replace(&self, overrides: FieldOverrides) -> Result<Self> {
        self.calendar.replace(*self, &overrides)
    }

    /// Get duration between two instants
    pub fn duration_since(&self, earlier: &Instant) -> Duration {
        Duration::from_secs(self.secs - earlier.secs)
    }

    /// Midnight of the same calendar day
    pub fn start_of_day(&self) -> Self {
        let f = self.fields();
        let elapsed = i64::from(f.hour) * SECONDS_PER_HOUR
            + i64::from(f.minute) * SECONDS_PER_MINUTE
            + i64::from(f.second);
        self.add_seconds(-elapsed)
    }

    pub fn is_before(&self, other: &Instant) -> bool {
        self.secs < other.secs
    }

    pub fn is_after(&self, other: &Instant) -> bool {
        self.secs > other.secs
    }
}

impl PartialEq for Instant {
    fn eq(&self, other: &Self) -> bool {
        self.secs == other.secs
    }
}

impl Eq for Instant {}

impl PartialOrd for Instant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instant {
    fn cmp(&self, other: &Self) -> Ordering {
        self.secs.cmp(&other.secs)
    }
}

impl Hash for Instant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.secs.hash(state);
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        self.add_seconds(rhs.total_seconds())
    }
}

impl Sub<Duration> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Duration) -> Instant {
        self.add_seconds(rhs.total_seconds().saturating_neg())
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        self.duration_since(&rhs)
    }
}

impl AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl SubAssign<Duration> for Instant {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_default_string())
    }
}

impl Serialize for Instant {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format(format::RFC3339_FORMAT))
    }
}

impl<'de> Deserialize<'de> for Instant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_in(Calendar::utc(), &s, format::RFC3339_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Offset;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> Instant {
        Instant::from_fields_in(Calendar::utc(), &CalendarFields::new(y, m, d, h, mi, s)).unwrap()
    }

    #[test]
    fn test_from_fields() {
        let dt = utc(2023, 5, 15, 14, 30, 45);
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), 5);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 45);
    }

    #[test]
    fn test_unix_epoch() {
        let dt = utc(1970, 1, 1, 0, 0, 0);
        assert_eq!(dt.epoch_seconds(), 0);
        assert_eq!(dt.epoch_millis(), 0);
    }

    #[test]
    fn test_pre_epoch() {
        let dt = utc(1969, 12, 31, 23, 59, 59);
        assert_eq!(dt.epoch_seconds(), -1);
        assert_eq!(dt.fields(), CalendarFields::new(1969, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_from_epoch_seconds() {
        let dt = Instant::from_epoch_seconds_in(Calendar::utc(), 1_609_459_200);
        assert_eq!(dt.epoch_seconds(), 1_609_459_200);
        assert_eq!(dt.fields(), CalendarFields::date(2021, 1, 1));
        assert_eq!(Instant::from_epoch_seconds(1_609_459_200).epoch_seconds(), 1_609_459_200);
    }

    #[test]
    fn test_from_epoch_seconds_saturates() {
        assert_eq!(Instant::from_epoch_seconds(i64::MAX), Instant::MAX);
        assert_eq!(Instant::from_epoch_seconds(i64::MIN), Instant::MIN);
        assert_eq!(Instant::MAX.fields(), CalendarFields::new(9999, 12, 31, 23, 59, 59));
        assert_eq!(Instant::MIN.fields(), CalendarFields::date(-9999, 1, 1));
    }

    #[test]
    fn test_now() {
        let a = Instant::now();
        let b = Instant::now();
        let diff = b - a;
        assert!(diff.total_seconds() >= 0);
        assert!(diff.total_seconds() < 2);
        assert!(a.year() >= 2024);
    }

    #[test]
    fn test_weekday_and_day_of_year() {
        let dt = utc(2023, 7, 15, 10, 30, 45);
        assert_eq!(dt.weekday(), 6);
        assert_eq!(dt.day_of_year(), 196);

        assert_eq!(utc(1970, 1, 1, 0, 0, 0).weekday(), 4);
        assert_eq!(utc(2024, 12, 31, 0, 0, 0).day_of_year(), 366);
    }

    #[test]
    fn test_linear_shifts() {
        let dt = utc(2023, 5, 15, 10, 30, 0);
        assert_eq!(dt.add_days(1).day(), 16);
        assert_eq!(dt.add_days(-1).day(), 14);
        assert_eq!(dt.add_hours(2).hour(), 12);

        let later = dt.add_minutes(30);
        assert_eq!(later.minute(), 0);
        assert_eq!(later.hour(), 11);

        let rolled = utc(2023, 12, 31, 23, 59, 59).add_seconds(1);
        assert_eq!(rolled.fields(), CalendarFields::date(2024, 1, 1));

        assert_eq!(dt.add_days(i64::MAX), Instant::MAX);
        assert_eq!(dt.add_seconds(i64::MIN), Instant::MIN);
    }

    #[test]
    fn test_calendar_shifts() {
        let dt = utc(2023, 5, 15, 10, 30, 0);
        assert_eq!(dt.add_months(1).month(), 6);
        assert_eq!(dt.add_years(1).year(), 2024);

        let jan31 = utc(2023, 1, 31, 0, 0, 0);
        assert_eq!(jan31.add_months(1).fields(), CalendarFields::date(2023, 3, 3));
    }

    #[test]
    fn test_replace() {
        let dt = utc(2023, 5, 15, 10, 30, 45);

        let r = dt.replace(FieldOverrides::new().with_year(2024)).unwrap();
        assert_eq!(r.fields(), CalendarFields::new(2024, 5, 15, 10, 30, 45));

        let r = dt.replace(FieldOverrides::new().with_month(12)).unwrap();
        assert_eq!(r.year(), 2023);
        assert_eq!(r.month(), 12);

        let noon = dt.replace(FieldOverrides::new().with_time(12, 0, 0)).unwrap();
        assert_eq!((noon.hour(), noon.minute(), noon.second()), (12, 0, 0));

        assert!(dt.replace(FieldOverrides::new().with_month(2).with_day(30)).is_err());
    }

    #[test]
    fn test_comparison() {
        let a = utc(2023, 5, 15, 10, 30, 0);
        let b = utc(2023, 5, 15, 10, 30, 0);
        let c = utc(2023, 5, 16, 10, 30, 0);
        assert!(a == b);
        assert!(a != c);
        assert!(a < c);
        assert!(a <= b);
        assert!(c > a);
        assert!(c >= a);
        assert!(a.is_before(&c));
        assert!(c.is_after(&a));
    }

    #[test]
    fn test_equality_ignores_calendar() {
        let a = utc(2023, 5, 15, 10, 30, 0);
        let tokyo = a.with_calendar(Calendar::fixed(Offset::from_hours(9).unwrap()));
        assert_eq!(a, tokyo);
        assert_eq!(tokyo.hour(), 19);
        assert_eq!(tokyo.epoch_seconds(), a.epoch_seconds());
    }

    #[test]
    fn test_duration_arithmetic() {
        let dt = utc(2025, 6, 15, 0, 0, 0);
        let later = dt + Duration::from_days(10);
        assert_eq!(later.fields(), CalendarFields::date(2025, 6, 25));
        assert_eq!(later - Duration::from_days(10), dt);
        assert_eq!((later - dt).days(), 10);
        assert_eq!((dt - later).days(), -10);

        let mut t = dt;
        t += Duration::from_hours(1);
        t -= Duration::from_minutes(30);
        assert_eq!(t.minute(), 30);
    }

    #[test]
    fn test_start_of_day() {
        let dt = utc(2023, 5, 15, 10, 30, 45);
        assert_eq!(dt.start_of_day(), utc(2023, 5, 15, 0, 0, 0));
        assert_eq!(Instant::MAX.start_of_day().fields(), CalendarFields::date(9999, 12, 31));
    }

    #[test]
    fn test_display() {
        let dt = utc(2023, 5, 15, 9, 30, 45);
        assert_eq!(dt.to_string(), "2023-05-15 09:30:45");
        assert_eq!(dt.to_default_string(), "2023-05-15 09:30:45");
        assert_eq!(dt.isoformat(), "2023-05-15T09:30:45");
        assert_eq!(dt.strftime("%Y-%m-%d"), "2023-05-15");
    }

    #[test]
    fn test_serde_round_trip() {
        let cal = Calendar::fixed(Offset::from_seconds(5 * 3600 + 30 * 60).unwrap());
        let fields = CalendarFields::new(2025, 6, 15, 14, 30, 0);
        let dt = Instant::from_fields_in(cal, &fields).unwrap();
        let json = serde_json::to_string(&dt).unwrap();
        assert_eq!(json, "\"2025-06-15T14:30:00+05:30\"");

        let back: Instant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dt);
        assert_eq!(back.calendar(), cal);
        assert_eq!(back.fields(), dt.fields());
    }

    #[test]
    fn test_serde_round_trip_at_range_edges() {
        for (edge, hours) in [(Instant::MAX, 1), (Instant::MIN, -1), (Instant::MAX, 14)] {
            let cal = Calendar::fixed(Offset::from_hours(hours).unwrap());
            let dt = edge.with_calendar(cal);
            let json = serde_json::to_string(&dt).unwrap();
            let back: Instant = serde_json::from_str(&json).unwrap();
            assert_eq!(back, dt, "{}", json);
            assert_eq!(back.calendar(), cal);
        }
    }

    #[test]
    fn test_serde_rejects_garbage() {
        assert!(serde_json::from_str::<Instant>("\"yesterday\"").is_err());
        assert!(serde_json::from_str::<Instant>("\"2023-02-30T00:00:00Z\"").is_err());
    }
}
