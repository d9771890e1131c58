//! Leap-year-aware date checks for ISO 8601 date and datetime fields.
//!
//! Dates use the extended `YYYY-MM-DD` form. A datetime carries its date
//! before a `T` (or space) separator. Years outside 1900..=2100 are
//! rejected, and February 29 only exists in Gregorian leap years.

use std::fmt;

use chrono::NaiveDate;
use nyher_model::{Finding, Row};

use super::answer_code::read;
use crate::engine::{RowRule, RuleContext};
use crate::error::RuleError;

pub const ID: &str = "date-format";

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Why a date value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Not `YYYY-MM-DD`.
    Format,
    /// Datetime without a time separator.
    MissingTime,
    Year(i32),
    Month(u32),
    Day { year: i32, month: u32, day: u32 },
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format => write!(f, "expected YYYY-MM-DD"),
            Self::MissingTime => write!(f, "expected a date followed by 'T' and a time"),
            Self::Year(year) => {
                write!(f, "year {year} is outside {MIN_YEAR}..={MAX_YEAR}")
            }
            Self::Month(month) => write!(f, "month {month} is outside 1..=12"),
            Self::Day { year, month, day } => write!(
                f,
                "day {day} is out of range for {year:04}-{month:02} (max {})",
                max_days_in_month(*year, *month)
            ),
        }
    }
}

/// Which form a field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    Date,
    Datetime,
}

/// Returns true if the given year is a leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub fn max_days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn digits(part: &str, len: usize) -> Option<u32> {
    if part.len() == len && part.bytes().all(|b| b.is_ascii_digit()) {
        part.parse().ok()
    } else {
        None
    }
}

/// Parse and range-check a `YYYY-MM-DD` date.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, DateError> {
    let mut parts = value.split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(DateError::Format);
    };
    let (Some(year), Some(month), Some(day)) = (digits(y, 4), digits(m, 2), digits(d, 2)) else {
        return Err(DateError::Format);
    };
    let year = i32::try_from(year).map_err(|_| DateError::Format)?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(DateError::Year(year));
    }
    if !(1..=12).contains(&month) {
        return Err(DateError::Month(month));
    }
    if day == 0 || day > max_days_in_month(year, month) {
        return Err(DateError::Day { year, month, day });
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateError::Day { year, month, day })
}

/// Parse the date part of an ISO 8601 datetime.
pub fn parse_datetime_date(value: &str) -> Result<NaiveDate, DateError> {
    let Some((date, time)) = value.split_once(['T', ' ']) else {
        return Err(DateError::MissingTime);
    };
    if time.trim().is_empty() {
        return Err(DateError::MissingTime);
    }
    parse_calendar_date(date)
}

pub fn check_value(kind: DateKind, value: &str) -> Result<NaiveDate, DateError> {
    let value = value.trim();
    match kind {
        DateKind::Date => parse_calendar_date(value),
        DateKind::Datetime => parse_datetime_date(value),
    }
}

/// One date or datetime field. Empty values are not checked.
#[derive(Debug, Clone)]
pub struct DateRule {
    reads: Vec<String>,
    kind: DateKind,
}

impl DateRule {
    pub fn new(field: impl Into<String>, kind: DateKind) -> Self {
        Self {
            reads: vec![field.into()],
            kind,
        }
    }
}

impl RowRule for DateRule {
    fn id(&self) -> &str {
        ID
    }

    fn reads(&self) -> &[String] {
        &self.reads
    }

    fn check(&self, row: &Row, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let [field] = self.reads.as_slice() else {
            return Err(RuleError::Failed("rule reads one field".to_string()));
        };
        let value = read(row, field)?;
        match check_value(self.kind, value) {
            Ok(_) => Ok(Vec::new()),
            Err(err) => {
                let raw = ctx.raw_value(row, field).unwrap_or(value);
                Ok(vec![
                    Finding::rule_violation(ID, format!("Invalid date '{raw}' for {field}: {err}"))
                        .with_field(field.as_str()),
                ])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_day_follows_gregorian_rule() {
        assert!(parse_calendar_date("2024-02-29").is_ok());
        assert!(parse_calendar_date("2000-02-29").is_ok());
        assert_eq!(
            parse_calendar_date("2100-02-29"),
            Err(DateError::Day {
                year: 2100,
                month: 2,
                day: 29
            })
        );
        assert!(parse_calendar_date("1900-02-29").is_err());
        assert!(parse_calendar_date("2023-02-29").is_err());
    }

    #[test]
    fn rejects_out_of_range_parts() {
        assert_eq!(parse_calendar_date("1899-12-31"), Err(DateError::Year(1899)));
        assert_eq!(parse_calendar_date("2101-01-01"), Err(DateError::Year(2101)));
        assert_eq!(parse_calendar_date("2024-13-01"), Err(DateError::Month(13)));
        assert!(parse_calendar_date("2024-04-31").is_err());
        assert!(parse_calendar_date("2024-04-00").is_err());
    }

    #[test]
    fn rejects_malformed_dates() {
        for value in ["20240229", "2024-2-29", "2024/02/29", "2024-02-29-01", "abcd-ef-gh", ""] {
            assert_eq!(parse_calendar_date(value), Err(DateError::Format), "{value}");
        }
    }

    #[test]
    fn datetime_needs_date_before_separator() {
        assert!(parse_datetime_date("2024-02-29T10:30:00Z").is_ok());
        assert!(parse_datetime_date("2024-02-29 10:30:00").is_ok());
        assert_eq!(parse_datetime_date("2024-02-29"), Err(DateError::MissingTime));
        assert!(parse_datetime_date("2100-02-29T00:00:00").is_err());
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = parse_calendar_date("2100-02-29").unwrap_err();
        assert_eq!(err.to_string(), "day 29 is out of range for 2100-02 (max 28)");
    }
}
