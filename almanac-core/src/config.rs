//! Process configuration
//!
//! The local calendar is a fixed UTC offset read from `ALMANAC_UTC_OFFSET`
//! the first time it is needed. Unset means UTC. A malformed value is logged
//! and ignored rather than failing every calendar operation.

use std::env;
use std::sync::OnceLock;

use crate::calendar::{Calendar, Offset};

/// Environment variable holding the local UTC offset, e.g. `+08:00`
pub const UTC_OFFSET_ENV: &str = "ALMANAC_UTC_OFFSET";

static LOCAL_CALENDAR: OnceLock<Calendar> = OnceLock::new();

/// The local calendar, resolved once per process
pub fn local_calendar() -> Calendar {
    *LOCAL_CALENDAR.get_or_init(calendar_from_env)
}

fn calendar_from_env() -> Calendar {
    match env::var(UTC_OFFSET_ENV) {
        Ok(raw) => calendar_from_value(&raw),
        Err(env::VarError::NotPresent) => {
            tracing::debug!("{} not set, using UTC", UTC_OFFSET_ENV);
            Calendar::utc()
        }
        Err(env::VarError::NotUnicode(raw)) => {
            tracing::warn!(value = ?raw, "{} is not valid unicode, using UTC", UTC_OFFSET_ENV);
            Calendar::utc()
        }
    }
}

/// Interpret a configured offset value
pub(crate) fn calendar_from_value(raw: &str) -> Calendar {
    match raw.parse::<Offset>() {
        Ok(offset) => {
            tracing::debug!(%offset, "local calendar configured from {}", UTC_OFFSET_ENV);
            Calendar::fixed(offset)
        }
        Err(err) => {
            tracing::warn!(value = raw, error = %err, "ignoring {}, using UTC", UTC_OFFSET_ENV);
            Calendar::utc()
        }
    }
}
