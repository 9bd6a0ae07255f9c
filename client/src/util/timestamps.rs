//! Timestamp parsing and relative formatting.
//!
//! The backend emits RFC 3339 for `booking_date` and plain `YYYY-MM-DD` for
//! `check_in`/`check_out`; some older records drop the offset. Everything
//! without an offset is read as UTC. Callers pass `now` explicitly.

#[cfg(test)]
#[path = "timestamps_test.rs"]
mod timestamps_test;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Parse an RFC 3339 timestamp, an offset-less `YYYY-MM-DDTHH:MM:SS[.f]`,
/// or a bare date (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    let naive = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
    if let Ok(ts) = PrimitiveDateTime::parse(raw, naive) {
        return Some(ts.assume_utc());
    }
    parse_date(raw).map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

/// Parse a `YYYY-MM-DD` calendar date.
#[must_use]
pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Midnight UTC of the day containing `now`.
#[must_use]
pub fn start_of_day(now: OffsetDateTime) -> OffsetDateTime {
    now.to_offset(time::UtcOffset::UTC).replace_time(Time::MIDNIGHT)
}

/// RFC 3339 rendering; falls back to the unix timestamp if formatting fails.
#[must_use]
pub fn to_rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Milliseconds since the epoch, used to build locally unique ids.
#[must_use]
pub fn unix_millis(ts: OffsetDateTime) -> i128 {
    ts.unix_timestamp_nanos() / 1_000_000
}

/// `Just now`, `Nm ago`, `Nh ago`, `Nd ago` (under a week), else the date.
///
/// Future timestamps read as `Just now`; unparsable input is returned as is.
#[must_use]
pub fn format_relative(timestamp: &str, now: OffsetDateTime) -> String {
    let Some(ts) = parse_timestamp(timestamp) else {
        return timestamp.to_owned();
    };
    let minutes = (now - ts).whole_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        "Just now".to_owned()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        ts.date().to_string()
    }
}
