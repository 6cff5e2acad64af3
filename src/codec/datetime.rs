//! Date/time field-set representation.
//!
//! Instants travel as `{year, month, day, hour, minute}`. Seconds and
//! sub-second precision are dropped on the way out, so a round trip is
//! exact to the minute.

use chrono::{Datelike, NaiveDate, Timelike};
use serde_json::{json, Value};

use crate::models::Instant;

const COMPONENTS: [&str; 5] = ["year", "month", "day", "hour", "minute"];

/// Reasons a field set cannot be read back as an instant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateFieldsError {
    #[error("expected a date/time mapping")]
    NotAMapping,
    #[error("missing or non-integer component `{0}`")]
    Component(&'static str),
    #[error("components do not form a valid date/time")]
    OutOfRange,
}

/// Encodes an instant as its field set.
///
/// Truncates to the minute. Both ends of `[01:00:00, 01:00:10)` encode as
/// `01:00`, so that booking decodes as a zero-length interval.
pub fn to_fields(instant: &Instant) -> Value {
    json!({
        "year": instant.year(),
        "month": instant.month(),
        "day": instant.day(),
        "hour": instant.hour(),
        "minute": instant.minute(),
    })
}

/// Decodes a field set into an instant at second zero.
pub fn from_fields(value: &Value) -> Result<Instant, DateFieldsError> {
    let map = value.as_object().ok_or(DateFieldsError::NotAMapping)?;

    let mut parts = [0i64; 5];
    for (slot, name) in parts.iter_mut().zip(COMPONENTS) {
        *slot = map
            .get(name)
            .and_then(Value::as_i64)
            .ok_or(DateFieldsError::Component(name))?;
    }
    let [year, month, day, hour, minute] = parts;

    let year = i32::try_from(year).map_err(|_| DateFieldsError::OutOfRange)?;
    let small = |v: i64| u32::try_from(v).map_err(|_| DateFieldsError::OutOfRange);
    let (month, day, hour, minute) = (small(month)?, small(day)?, small(hour)?, small(minute)?);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or(DateFieldsError::OutOfRange)
}
