//! Proleptic Gregorian arithmetic
//!
//! Day numbers count days since 1970-01-01. Nothing here knows about
//! offsets or instants; the normalizer in `calendar` builds on these.

// ============================================================================
// Constants
// ============================================================================

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Smallest year that can be composed in UTC
pub const MIN_YEAR: i32 = -9999;
/// Largest year that can be composed in UTC
pub const MAX_YEAR: i32 = 9999;

/// Days in each month (non-leap year)
const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days from 0000-03-01 to 1970-01-01
const UNIX_EPOCH_DAYS: i64 = 719_468;

// ============================================================================
// Calendar rules
// ============================================================================

/// Check if year is a leap year
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Get days in a month, or 0 when `month` is not in 1-12
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => DAYS_IN_MONTH[(month - 1) as usize],
        _ => 0,
    }
}

/// Get days in a year (365 or 366)
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

// ============================================================================
// Day numbers
// ============================================================================

/// Convert a civil date to days since 1970-01-01.
///
/// `day` is not checked against the month length: a day past the end of the
/// month lands in the following month. Algorithm from Howard Hinnant,
/// http://howardhinnant.github.io/date_algorithms.html
pub const fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year as i64 - 1 } else { year as i64 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400; // [0, 399]
    let m = month as i64;
    let mp = if m > 2 { m - 3 } else { m + 9 }; // [0, 11], March = 0
    let doy = (153 * mp + 2) / 5 + day as i64 - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
    era * 146_097 + doe - UNIX_EPOCH_DAYS
}

/// Convert days since 1970-01-01 to a civil (year, month, day)
pub fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + UNIX_EPOCH_DAYS;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = if mp < 10 { mp + 3 } else { mp - 9 }; // [1, 12]
    let year = if m <= 2 { y + 1 } else { y };
    (year as i32, m as u32, d as u32)
}

/// Day of week for a day number, 0=Sunday..6=Saturday
pub fn weekday_from_days(days: i64) -> u32 {
    // 1970-01-01 was a Thursday
    (days + 4).rem_euclid(7) as u32
}

/// 1-based ordinal day within the year
pub fn day_of_year(year: i32, month: u32, day: u32) -> u32 {
    (days_from_civil(year, month, day) - days_from_civil(year, 1, 1) + 1) as u32
}

/// Inverse of [`day_of_year`]. `None` when `ordinal` is not a day of `year`.
pub fn month_day_from_ordinal(year: i32, ordinal: u32) -> Option<(u32, u32)> {
    if ordinal == 0 || ordinal > days_in_year(year) {
        return None;
    }
    let days = days_from_civil(year, 1, 1) + i64::from(ordinal) - 1;
    let (_, month, day) = civil_from_days(days);
    Some((month, day))
}
