//! Parsing helpers for form and query-string values.
//!
//! Browsers submit everything as text, `datetime-local` inputs omit seconds and
//! unchecked boxes are simply absent, so raw values are parsed here rather than
//! through serde.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::FormErrors;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// `None` for absent or blank values.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parses a date-time; a bare date means midnight of that day.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Required date-time field; records a message against `field` on failure.
pub fn required_datetime(
    errors: &mut FormErrors,
    field: &str,
    label: &str,
    value: &str,
) -> Option<NaiveDateTime> {
    if value.trim().is_empty() {
        errors.push(Some(field), format!("{label} is required."));
        return None;
    }
    let parsed = parse_datetime(value);
    if parsed.is_none() {
        errors.push(Some(field), format!("{label} is not a valid date."));
    }
    parsed
}

/// Required positive identifier field, such as a dropdown selection.
pub fn required_id(errors: &mut FormErrors, field: &str, label: &str, value: &str) -> Option<i64> {
    if value.trim().is_empty() {
        errors.push(Some(field), format!("{label} is required."));
        return None;
    }
    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.push(Some(field), format!("{label} is not valid."));
            None
        }
    }
}

/// Optional query-string date-time filter.
pub fn optional_datetime(
    errors: &mut FormErrors,
    field: &str,
    value: Option<&str>,
) -> Option<NaiveDateTime> {
    let value = non_empty(value)?;
    let parsed = parse_datetime(value);
    if parsed.is_none() {
        errors.push(Some(field), format!("{field} is not a valid date."));
    }
    parsed
}

pub fn optional_id(errors: &mut FormErrors, field: &str, value: Option<&str>) -> Option<i64> {
    let value = non_empty(value)?;
    match value.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(Some(field), format!("{field} is not a valid identifier."));
            None
        }
    }
}

pub fn optional_bool(errors: &mut FormErrors, field: &str, value: Option<&str>) -> Option<bool> {
    let value = non_empty(value)?;
    let parsed = parse_bool(value);
    if parsed.is_none() {
        errors.push(Some(field), format!("{field} must be true or false."));
    }
    parsed
}
