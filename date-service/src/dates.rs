//! Conversion between the user-facing `DD/MM/YYYY` form and the canonical
//! stored timestamp.
//!
//! The canonical form is midnight UTC of the calendar date with six
//! fractional digits and an explicit offset, e.g.
//! `2024-12-25T00:00:00.000000+00:00`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

/// Input format accepted by [`normalize`] and produced by [`denormalize`].
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("use DD/MM/YYYY format")]
pub struct ValidationError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot read stored date {value:?}")]
pub struct ParseError {
    pub value: String,
}

/// Strictly parses `DD/MM/YYYY` and returns the canonical UTC timestamp.
pub fn normalize(input: &str) -> Result<String, ValidationError> {
    let date = parse_display(input)?;
    Ok(date
        .and_time(NaiveTime::MIN)
        .and_utc()
        .format(CANONICAL_FORMAT)
        .to_string())
}

/// Reformats a stored timestamp as `DD/MM/YYYY` in UTC.
///
/// Accepts RFC 3339 timestamps with any offset, offset-less ISO-8601
/// date-times (read as UTC) and bare `YYYY-MM-DD` dates.
pub fn denormalize(stored: &str) -> Result<String, ParseError> {
    let date = parse_stored(stored.trim()).ok_or_else(|| ParseError {
        value: stored.to_string(),
    })?;
    Ok(date.format(DISPLAY_FORMAT).to_string())
}

fn parse_display(input: &str) -> Result<NaiveDate, ValidationError> {
    // chrono accepts unpadded fields and signed years, so the shape is checked first.
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'/',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(ValidationError);
    }

    NaiveDate::parse_from_str(input, DISPLAY_FORMAT).map_err(|_| ValidationError)
}

fn parse_stored(stored: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(stored) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(stored, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(stored, "%Y-%m-%d").ok()
}
