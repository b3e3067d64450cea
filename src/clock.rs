//! Forum time strings.
//!
//! Timestamps are stored as `+08:00` wall-clock strings
//! (`2020-08-01T12:30:00+08:00`). All stored times share this single offset,
//! so plain string comparison orders them chronologically.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+08:00";

const OFFSET_HOURS: i64 = 8;

pub fn format_time(instant: DateTime<Utc>) -> String {
    (instant.naive_utc() + Duration::hours(OFFSET_HOURS))
        .format(TIME_FORMAT)
        .to_string()
}

pub fn current_time() -> String {
    format_time(Utc::now())
}

/// Parse a stored time string back into an absolute instant.
/// Anything not in the exact stored format yields `None`.
pub fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    let wall = NaiveDateTime::parse_from_str(s, TIME_FORMAT).ok()?;
    Some(wall.checked_sub_signed(Duration::hours(OFFSET_HOURS))?.and_utc())
}
