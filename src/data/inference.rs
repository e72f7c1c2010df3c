//! Column type inference and calendar-date parsing.

use crate::constants::TYPE_INFERENCE_SAMPLE;
use crate::types::{CellValue, ColumnType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date-only layouts tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Date-time layouts tried in order (interpreted as UTC)
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse text as a calendar date.
///
/// Accepts RFC 3339 / RFC 2822 timestamps (normalized to UTC), common
/// date-time layouts and common date-only layouts.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        })
}

/// Parse any cell as a calendar date. Numbers are Unix epoch milliseconds.
pub fn parse_date_value(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Number(n) if n.is_finite() => {
            DateTime::<Utc>::from_timestamp_millis(*n as i64).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

fn is_boolean_word(value: &CellValue) -> bool {
    match value {
        CellValue::Bool(_) => true,
        CellValue::Text(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "false" | "yes" | "no" | "y" | "n"
        ),
        _ => false,
    }
}

/// Infer the type of a column by sampling its non-blank values
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> ColumnType {
    let sample: Vec<&CellValue> = values
        .into_iter()
        .filter(|v| !v.is_blank())
        .take(TYPE_INFERENCE_SAMPLE)
        .collect();

    if sample.is_empty() {
        return ColumnType::Text;
    }

    if sample.iter().all(|v| v.as_f64().is_some()) {
        return ColumnType::Number;
    }

    if sample.iter().all(|v| is_boolean_word(v)) {
        return ColumnType::Boolean;
    }

    if sample
        .iter()
        .all(|v| matches!(v, CellValue::Text(s) if parse_date_text(s).is_some()))
    {
        return ColumnType::Date;
    }

    ColumnType::Text
}
