//! Report freshness formatting ("5m ago", "3h ago", "2d ago")

use chrono::{DateTime, Utc};

use crate::models::errors::{AppError, AppResult};

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Parse an RFC 3339 timestamp and normalise it to UTC
pub fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::invalid_timestamp(raw, e))
}

/// Elapsed time between `timestamp` and `now` (wall clock when `None`),
/// floored to whole minutes, hours or days.
pub fn time_ago(timestamp: &str, now: Option<&str>) -> AppResult<String> {
    let then = parse_timestamp(timestamp)?;
    let now = match now {
        Some(raw) => parse_timestamp(raw)?,
        None => Utc::now(),
    };
    Ok(format_elapsed(then, now))
}

/// `time_ago` over already-parsed instants. Future instants read "0m ago".
pub fn format_elapsed(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);

    if secs < SECS_PER_HOUR {
        format!("{}m ago", secs / SECS_PER_MINUTE)
    } else if secs < SECS_PER_DAY {
        format!("{}h ago", secs / SECS_PER_HOUR)
    } else {
        format!("{}d ago", secs / SECS_PER_DAY)
    }
}
