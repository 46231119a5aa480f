use crate::errors::TrackerError;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};

/// Format accepted for caller-supplied times.
pub const INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Nap start/end in a day summary (24-hour clock).
pub const NAP_CLOCK_FORMAT: &str = "%H:%M";
/// Active session start (12-hour clock).
pub const ACTIVE_CLOCK_FORMAT: &str = "%I:%M %p";

const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const STORED_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Local wall-clock time, truncated to microseconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TrackerError> {
    NaiveDateTime::parse_from_str(value.trim(), INPUT_FORMAT).map_err(|source| {
        TrackerError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

pub fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<NaiveDateTime>, TrackerError> {
    value.map(parse_timestamp).transpose()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| {
        TrackerError::InvalidDate {
            value: value.to_string(),
            source,
        }
    })
}

pub fn to_stored(value: NaiveDateTime) -> String {
    value.format(STORED_WRITE_FORMAT).to_string()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a stored timestamp, ignoring any fractional-seconds suffix.
pub fn from_stored(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let whole = raw.split('.').next().unwrap_or(raw);
    NaiveDateTime::parse_from_str(whole.trim(), STORED_FORMAT)
}

/// Renders a duration as `H:MM:SS`, prefixed with a day count once it
/// spans a full day. Negative spans borrow from the day count.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let days = total.div_euclid(86_400);
    let rest = total.rem_euclid(86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3_600, rest % 3_600 / 60, rest % 60);
    match days {
        0 => clock,
        1 | -1 => format!("{days} day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}

pub fn format_hours(duration: Duration) -> String {
    format!("{:.2}", hours(duration))
}

pub fn hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 3_600.0
}
