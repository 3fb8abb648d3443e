//! Timestamp parsing and rendering.
//!
//! Everything is held in UTC internally; a display offset is applied only
//! when rendering.

use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Month,
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("unparseable timestamp '{0}'")]
    Timestamp(String),
    #[error("unparseable UTC offset '{0}' (expected e.g. '+01:00')")]
    Offset(String),
}

/// Parses an ISO-8601 style timestamp and normalizes it to UTC.
///
/// Besides RFC 3339 this accepts a space or `T` separator, optional
/// seconds and fractional seconds, `Z`, `±HH:MM` or `±HHMM` offsets, and
/// bare dates. Values without an offset are taken as UTC; bare dates are
/// midnight UTC.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, TimestampError> {
    let s = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(ts.to_offset(UtcOffset::UTC));
    }

    let mut normalized = s.replacen('T', " ", 1);
    if let Some(stripped) = normalized.strip_suffix('Z') {
        normalized = format!("{stripped}+00:00");
    }

    if let Ok(ts) = OffsetDateTime::parse(
        &normalized,
        format_description!(
            "[year]-[month]-[day] [hour]:[minute][optional [:[second][optional [.[subsecond]]]]][offset_hour sign:mandatory][optional [:]][offset_minute]"
        ),
    ) {
        return Ok(ts.to_offset(UtcOffset::UTC));
    }

    if let Ok(ts) = PrimitiveDateTime::parse(
        &normalized,
        format_description!(
            "[year]-[month]-[day] [hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
        ),
    ) {
        return Ok(ts.assume_utc());
    }

    Date::parse(&normalized, format_description!("[year]-[month]-[day]"))
        .map(|d| d.midnight().assume_utc())
        .map_err(|_| TimestampError::Timestamp(raw.to_string()))
}

/// Parses `+HH:MM` / `-HH:MM`, or `UTC` / `Z`.
pub fn parse_offset(raw: &str) -> Result<UtcOffset, TimestampError> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("utc") || s == "Z" {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(s, format_description!("[offset_hour sign:mandatory]:[offset_minute]"))
        .map_err(|_| TimestampError::Offset(raw.to_string()))
}

/// Renders `ts` as RFC 3339 in the given display offset.
pub fn format_timestamp(
    ts: OffsetDateTime,
    offset: UtcOffset,
) -> Result<String, time::error::Format> {
    ts.to_offset(offset).format(&Rfc3339)
}

/// Midnight UTC on 1 January of `year`.
pub fn year_start(year: i32) -> Option<OffsetDateTime> {
    Date::from_calendar_date(year, Month::January, 1)
        .ok()
        .map(|d| d.midnight().assume_utc())
}
