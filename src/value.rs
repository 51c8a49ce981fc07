//! Typed scalar values held by dataset and table rows.
//!
//! [`Value`] covers the scalar kinds a database column can hold plus two
//! markers: [`Value::Null`] for an explicit SQL `NULL` and [`Value::Ignore`]
//! for an expected-row placeholder that accepts any actual value.
//!
//! Values read from text (CSV cells, dataset literals) go through
//! [`Value::infer`]; a textual value can later be re-read as the kind of
//! another value with [`Value::coerce_like`], which is what makes the default
//! equality policy type-aware.

use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Ignore,
    String(String),
    Integer(i64),
    Decimal(Decimal),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Guid(Uuid),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Ignore => "<ignored>".to_string(),
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => d.normalize().to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Time(t) => t.format("%H:%M:%S").to_string(),
            Value::Guid(g) => g.to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_ignore(&self) -> bool {
        matches!(self, Value::Ignore)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Decimal(_) | Value::Float(_))
    }

    /// Exact decimal view of a numeric value. Floats that cannot be
    /// represented (NaN, infinities) yield `None`.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(i) => Some(Decimal::from(*i)),
            Value::Decimal(d) => Some(*d),
            Value::Float(f) => Decimal::try_from(*f).ok(),
            _ => None,
        }
    }

    /// Infers the most specific kind for a textual cell. Empty text is `NULL`.
    pub fn infer(raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Null;
        }
        let trimmed = raw.trim();
        if has_leading_zero(trimmed) {
            return Value::String(raw.to_string());
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if looks_numeric(trimmed)
            && let Ok(d) = parse_decimal_literal(trimmed)
        {
            return Value::Decimal(d);
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Boolean(false);
        }
        if let Ok(d) = parse_naive_date(trimmed) {
            return Value::Date(d);
        }
        if let Ok(dt) = parse_naive_datetime(trimmed) {
            return Value::DateTime(dt);
        }
        if let Ok(t) = parse_naive_time(trimmed) {
            return Value::Time(t);
        }
        if trimmed.len() >= 32
            && let Ok(g) = Uuid::parse_str(trimmed.trim_matches(|c| matches!(c, '{' | '}')))
        {
            return Value::Guid(g);
        }
        Value::String(raw.to_string())
    }

    /// Re-reads a textual value as the kind of `target`. Returns `None` when
    /// `self` is not a string or the text does not parse as that kind.
    pub fn coerce_like(&self, target: &Value) -> Option<Value> {
        let Value::String(raw) = self else {
            return None;
        };
        let text = raw.trim();
        match target {
            Value::Integer(_) | Value::Decimal(_) | Value::Float(_)
                if !has_leading_zero(text) =>
            {
                parse_decimal_literal(text).ok().map(Value::Decimal)
            }
            Value::Boolean(_) => parse_boolean(text).map(Value::Boolean),
            Value::Date(_) => parse_naive_date(text).ok().map(Value::Date),
            Value::DateTime(_) => parse_naive_datetime(text)
                .ok()
                .map(Value::DateTime)
                .or_else(|| {
                    parse_naive_date(text)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(Value::DateTime)
                }),
            Value::Time(_) => parse_naive_time(text).ok().map(Value::Time),
            Value::Guid(_) => Uuid::parse_str(text.trim_matches(|c| matches!(c, '{' | '}')))
                .ok()
                .map(Value::Guid),
            Value::Integer(_) | Value::Decimal(_) | Value::Float(_) => None,
            Value::String(_) | Value::Null | Value::Ignore => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            other => serializer.serialize_str(&other.as_display()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Guid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

fn looks_numeric(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1
}

/// Zero-padded digits such as `007` are codes, not numbers.
fn has_leading_zero(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    let mut chars = digits.chars();
    looks_numeric(value)
        && chars.next() == Some('0')
        && chars.next().is_some_and(|c| c.is_ascii_digit())
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_decimal_literal(value: &str) -> Result<Decimal> {
    value
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| anyhow!("Failed to parse '{value}' as decimal"))
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

pub fn parse_naive_time(value: &str) -> Result<NaiveTime> {
    const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];
    for fmt in TIME_FORMATS {
        if let Ok(parsed) = NaiveTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as time"))
}
