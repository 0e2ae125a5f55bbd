//! Scalar cell values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, Column, DataType, TimeUnit};
use serde::{Deserialize, Serialize};

// Days from 0001-01-01 to the Unix epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single cell.
///
/// Equality and hashing treat numbers by bit pattern (with `-0.0`
/// normalised), so values can be counted and deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. Booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::DateTime(_) => 3,
            Value::Text(_) => 4,
        }
    }

    /// Total order used for sorting: nulls, booleans, numbers, datetimes, text.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn number_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => number_bits(*a) == number_bits(*b),
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => number_bits(*n).hash(state),
            Value::DateTime(dt) => dt.hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<AnyValue<'_>> for Value {
    fn from(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Value::Null,
            AnyValue::Boolean(b) => Value::Bool(b),
            AnyValue::String(s) => Value::Text(s.to_string()),
            AnyValue::StringOwned(s) => Value::Text(s.to_string()),
            AnyValue::Date(days) => NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(Value::DateTime)
                .unwrap_or(Value::Null),
            AnyValue::Datetime(ts, unit, _) => timestamp(ts, unit)
                .map(Value::DateTime)
                .unwrap_or(Value::Null),
            other => match other.extract::<f64>() {
                Some(n) => Value::Number(n),
                None => Value::Text(other.to_string()),
            },
        }
    }
}

fn timestamp(ts: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let utc = match unit {
        TimeUnit::Nanoseconds => DateTime::from_timestamp_nanos(ts),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(ts)?,
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(ts)?,
    };
    Some(utc.naive_utc())
}

/// Declared storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Number,
    Boolean,
    DateTime,
    Text,
    /// No non-null values.
    Empty,
    /// Non-null values of more than one kind. Stored as text in a frame.
    Mixed,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Number => "number",
            ColumnKind::Boolean => "boolean",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Text => "text",
            ColumnKind::Empty => "empty",
            ColumnKind::Mixed => "mixed",
        }
    }

    /// Kind of a frame column, from its dtype.
    pub fn of_column(column: &Column) -> Self {
        if column.null_count() == column.len() {
            return ColumnKind::Empty;
        }
        match column.dtype() {
            dtype if dtype.is_float() || dtype.is_integer() => ColumnKind::Number,
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Date | DataType::Datetime(_, _) => ColumnKind::DateTime,
            _ => ColumnKind::Text,
        }
    }

    /// Kind shared by all non-null values.
    pub fn of(values: &[Value]) -> Self {
        let mut kind = ColumnKind::Empty;
        for value in values {
            let this = match value {
                Value::Null => continue,
                Value::Bool(_) => ColumnKind::Boolean,
                Value::Number(_) => ColumnKind::Number,
                Value::DateTime(_) => ColumnKind::DateTime,
                Value::Text(_) => ColumnKind::Text,
            };
            if kind == ColumnKind::Empty {
                kind = this;
            } else if kind != this {
                return ColumnKind::Mixed;
            }
        }
        kind
    }
}
