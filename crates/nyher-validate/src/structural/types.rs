//! Cell type casting for the table schema subset used by screening specs.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use nyher_model::{FieldSpec, FieldType};
use serde_json::Value;

const TRUE_VALUES: &[&str] = &["true", "True", "TRUE", "1"];
const FALSE_VALUES: &[&str] = &["false", "False", "FALSE", "0"];

/// Format name as rendered in type error notes.
pub fn format_name(field: &FieldSpec) -> &str {
    field.format.as_deref().unwrap_or("default")
}

fn custom_format(field: &FieldSpec) -> Option<&str> {
    field.format.as_deref().filter(|f| f.contains('%'))
}

fn is_any_format(field: &FieldSpec) -> bool {
    field.format.as_deref() == Some("any")
}

fn parse_date(field: &FieldSpec, value: &str) -> Option<NaiveDate> {
    if let Some(format) = custom_format(field) {
        return NaiveDate::parse_from_str(value, format).ok();
    }
    let formats: &[&str] = if is_any_format(field) {
        &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"]
    } else {
        &["%Y-%m-%d"]
    };
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_datetime(field: &FieldSpec, value: &str) -> Option<NaiveDateTime> {
    if let Some(format) = custom_format(field) {
        return NaiveDateTime::parse_from_str(value, format).ok();
    }
    if let Ok(zoned) = DateTime::parse_from_rfc3339(value) {
        return Some(zoned.naive_utc());
    }
    let mut formats = vec!["%Y-%m-%dT%H:%M:%S%.f"];
    if is_any_format(field) {
        formats.extend(["%Y-%m-%d %H:%M:%S%.f", "%m/%d/%Y %H:%M:%S", "%Y-%m-%dT%H:%M"]);
    }
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn parse_time(field: &FieldSpec, value: &str) -> Option<NaiveTime> {
    let format = custom_format(field).unwrap_or("%H:%M:%S%.f");
    NaiveTime::parse_from_str(value, format).ok()
}

/// Whether `value` casts to the field's declared type.
pub fn is_valid_type(field: &FieldSpec, value: &str) -> bool {
    match field.field_type {
        FieldType::String | FieldType::Any | FieldType::Other => true,
        FieldType::Integer => value.parse::<i64>().is_ok(),
        FieldType::Number => value.parse::<f64>().is_ok(),
        FieldType::Boolean => TRUE_VALUES.contains(&value) || FALSE_VALUES.contains(&value),
        FieldType::Date => parse_date(field, value).is_some(),
        FieldType::Datetime => parse_datetime(field, value).is_some(),
        FieldType::Time => parse_time(field, value).is_some(),
        FieldType::Year => value.len() == 4 && value.parse::<u16>().is_ok(),
    }
}

/// Compare a typed cell with a `minimum`/`maximum` bound.
///
/// Numeric types compare numerically; temporal and string values compare
/// by their text, which orders correctly for ISO 8601.
pub fn compare_bound(field: &FieldSpec, value: &str, bound: &Value) -> Option<Ordering> {
    let bound_text = match bound {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    match field.field_type {
        FieldType::Integer | FieldType::Number | FieldType::Year => {
            let value: f64 = value.parse().ok()?;
            let bound: f64 = bound.as_f64().or_else(|| bound_text.parse().ok())?;
            value.partial_cmp(&bound)
        }
        FieldType::Date => {
            let value = parse_date(field, value)?;
            let bound = parse_date(field, &bound_text)?;
            Some(value.cmp(&bound))
        }
        _ => Some(value.cmp(bound_text.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(field_type: FieldType, format: Option<&str>) -> FieldSpec {
        let mut field = FieldSpec::named("X");
        field.field_type = field_type;
        field.format = format.map(str::to_string);
        field
    }

    #[test]
    fn casts_scalar_types() {
        assert!(is_valid_type(&field(FieldType::Integer, None), "42"));
        assert!(!is_valid_type(&field(FieldType::Integer, None), "4.2"));
        assert!(is_valid_type(&field(FieldType::Number, None), "4.2"));
        assert!(is_valid_type(&field(FieldType::Boolean, None), "TRUE"));
        assert!(!is_valid_type(&field(FieldType::Boolean, None), "yes"));
        assert!(is_valid_type(&field(FieldType::Year, None), "1999"));
        assert!(!is_valid_type(&field(FieldType::Year, None), "99"));
    }

    #[test]
    fn casts_temporal_types() {
        let date = field(FieldType::Date, None);
        assert!(is_valid_type(&date, "2024-02-29"));
        assert!(!is_valid_type(&date, "2023-02-29"));
        assert!(!is_valid_type(&date, "02/28/2023"));
        assert!(is_valid_type(&field(FieldType::Date, Some("%m/%d/%Y")), "02/28/2023"));

        let datetime = field(FieldType::Datetime, None);
        assert!(is_valid_type(&datetime, "2024-01-05T10:00:00Z"));
        assert!(is_valid_type(&datetime, "2024-01-05T10:00:00"));
        assert!(!is_valid_type(&datetime, "2024-01-05"));
    }

    #[test]
    fn bounds_compare_by_type() {
        let int = field(FieldType::Integer, None);
        assert_eq!(compare_bound(&int, "9", &Value::from(10)), Some(Ordering::Less));
        let date = field(FieldType::Date, None);
        assert_eq!(
            compare_bound(&date, "2024-01-01", &Value::from("2023-12-31")),
            Some(Ordering::Greater)
        );
    }
}
