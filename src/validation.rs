//! Field validators shared by all write payloads.
//!
//! Each helper records its messages into a [`FieldErrors`] and returns the
//! cleaned value when the field passed, so a payload can report every
//! failing field in one response.

use chrono::{DateTime, NaiveTime, SubsecRound, Utc};

use crate::config::Bounds;
use crate::error::FieldErrors;

pub const KEY_MAX_LENGTH: usize = 100;
pub const NAME_MAX_LENGTH: usize = 100;
pub const MAC_MAX_LENGTH: usize = 17;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const ALPHANUMERIC: &str = "Only alphanumeric characters are allowed.";

/// Matches `^[0-9a-zA-Z]+$`.
pub fn is_alphanumeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Present, non-null value.
pub fn required<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

/// Required, non-blank string no longer than `max_length` characters.
pub fn text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_length: usize,
) -> Option<String> {
    // ---
    let value = required(errors, field, value)?;
    if value.trim().is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if value.chars().count() > max_length {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_length} characters."),
        );
        return None;
    }
    Some(value)
}

/// Required alphanumeric key such as an RFID or IMEI.
pub fn key(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    // ---
    let value = text(errors, field, value, KEY_MAX_LENGTH)?;
    if !is_alphanumeric(&value) {
        errors.add(field, ALPHANUMERIC);
        return None;
    }
    Some(value)
}

/// Required float inside `bounds`.
pub fn bounded(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<f64>,
    bounds: &Bounds,
) -> Option<f64> {
    // ---
    let value = required(errors, field, value)?;
    if !value.is_finite() {
        errors.add(field, "A valid number is required.");
        return None;
    }
    if let Some(message) = bounds.check(value) {
        errors.add(field, message);
        return None;
    }
    Some(value)
}

/// Required RFC 3339 timestamp, normalized to UTC.
pub fn datetime(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
) -> Option<DateTime<Utc>> {
    // ---
    let value = required(errors, field, value)?;
    match parse_datetime(&value) {
        Some(parsed) => Some(parsed),
        None => {
            errors.add(
                field,
                "Datetime has wrong format. Use RFC 3339, e.g. 2015-05-13T07:00:00Z.",
            );
            None
        }
    }
}

/// Required time of day, `HH:MM[:SS[.ffffff]]`.
pub fn time_of_day(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
) -> Option<NaiveTime> {
    // ---
    let value = required(errors, field, value)?;
    let value = value.trim();
    let parsed = NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"));
    match parsed {
        Ok(time) => Some(time),
        Err(_) => {
            errors.add(field, "Time has wrong format. Use hh:mm[:ss[.uuuuuu]].");
            None
        }
    }
}

/// Parse an RFC 3339 timestamp, as used in request bodies and URL keys.
///
/// Truncated to microseconds, the precision PostgreSQL stores.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(6))
}
