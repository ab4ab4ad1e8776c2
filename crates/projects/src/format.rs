//! Display formatting for project timestamps.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

const PER_SECOND: i64 = 1_000;
const PER_MINUTE: i64 = 60 * PER_SECOND;
const PER_HOUR: i64 = 60 * PER_MINUTE;
const PER_DAY: i64 = 24 * PER_HOUR;
const PER_WEEK: i64 = 7 * PER_DAY;
const PER_MONTH: i64 = 30 * PER_DAY;
const PER_YEAR: i64 = 365 * PER_DAY;

/// Short English relative time of `timestamp_ms` as seen from `now_ms`,
/// e.g. `"5 min. ago"` or `"in 2 days"`.
pub fn format_relative(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = timestamp_ms.saturating_sub(now_ms);
    let abs = diff.saturating_abs();

    if abs < PER_SECOND {
        return "just now".to_string();
    }

    let (per, one, many) = if abs < PER_MINUTE {
        (PER_SECOND, "sec.", "sec.")
    } else if abs < PER_HOUR {
        (PER_MINUTE, "min.", "min.")
    } else if abs < PER_DAY {
        (PER_HOUR, "hr.", "hr.")
    } else if abs < PER_WEEK {
        (PER_DAY, "day", "days")
    } else if abs < PER_MONTH {
        (PER_WEEK, "wk.", "wk.")
    } else if abs < PER_YEAR {
        (PER_MONTH, "mo.", "mo.")
    } else {
        (PER_YEAR, "yr.", "yr.")
    };

    let count = abs / per;
    let unit = if count == 1 { one } else { many };
    if diff < 0 {
        format!("{count} {unit} ago")
    } else {
        format!("in {count} {unit}")
    }
}

/// `YYYY-MM-DD HH:MM:SS` in local time. `None` when out of range.
pub fn format_timestamp(timestamp_ms: i64) -> Option<String> {
    format_timestamp_in(timestamp_ms, &Local)
}

pub fn format_timestamp_in<Tz>(timestamp_ms: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let utc = DateTime::from_timestamp_millis(timestamp_ms)?;
    Some(
        utc.with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}
