//! Typed cell values and the coercion rules that produce them.
//!
//! [`coerce`] is total: every `(raw, type)` pair yields either a value in the
//! column's canonical form or `None`. Temporal values are normalized to one
//! wire format, UTC ISO 8601 with millisecond precision
//! (`2025-10-01T00:00:00.000Z`), whatever format the sheet used.

use std::fmt;

use chrono::{Datelike, DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::catalog::ColumnType;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%m/%d/%y",
    "%d/%m/%y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%d/%m/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%d/%m/%y %H:%M",
];

/// Offset layouts; `%#z` takes `+00`, `+0530` and `+05:30`.
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Numeric(f64),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Numeric(f) => {
                if is_whole(*f) {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Timestamp(ts) => format_timestamp(ts),
        }
    }

    /// True when the value already has the canonical shape for `ty`.
    pub fn conforms_to(&self, ty: ColumnType) -> bool {
        match (self, ty) {
            (Value::Integer(i), ColumnType::Integer) => i32::try_from(*i).is_ok(),
            (Value::Integer(_), ColumnType::BigInt) => true,
            (Value::Numeric(f), ColumnType::Numeric) => f.is_finite(),
            (Value::Timestamp(_), ty) => ty.is_temporal(),
            (Value::String(_), ColumnType::String) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Numeric(f) if is_whole(*f) => serializer.serialize_i64(*f as i64),
            Value::Numeric(f) => serializer.serialize_f64(*f),
            Value::Timestamp(ts) => serializer.serialize_str(&format_timestamp(ts)),
        }
    }
}

fn is_whole(value: f64) -> bool {
    value.fract() == 0.0 && value.abs() < 1e15
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Converts a raw cell into the column's type. Blank input and unparseable
/// input both degrade to `None`.
pub fn coerce(raw: Option<&str>, ty: ColumnType) -> Option<Value> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }
    match ty {
        ColumnType::String => Some(Value::String(raw.to_string())),
        ColumnType::Integer => parse_integer(raw)
            .filter(|value| i32::try_from(*value).is_ok())
            .map(Value::Integer),
        ColumnType::BigInt => parse_integer(raw).map(Value::Integer),
        ColumnType::Numeric => parse_numeric(raw).map(Value::Numeric),
        ColumnType::Date | ColumnType::Timestamp | ColumnType::TimestampTz => {
            parse_timestamp(raw).map(Value::Timestamp)
        }
    }
}

pub fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

pub fn parse_numeric(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// Offset-carrying input is converted to UTC; naive dates and date-times are
/// taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(parsed) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(naive) = parse_naive_datetime(trimmed) {
        return Some(naive.and_utc());
    }
    parse_naive_date(trimmed).map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// `%Y` accepts a year of any width; only four-digit years count, so
/// `1/2/25` falls through to the `%y` layouts.
fn full_year(fmt: &str, year: i32) -> bool {
    !fmt.contains("%Y") || (1000..=9999).contains(&year)
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(value, fmt)
            .ok()
            .filter(|date| full_year(fmt, date.year()))
    })
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(value, fmt)
            .ok()
            .filter(|datetime| full_year(fmt, datetime.year()))
    })
}
