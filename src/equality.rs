//! Column value equality policies.

use std::fmt;

use crate::value::Value;

/// Decides whether an expected column value is satisfied by an actual one.
///
/// `NULL` pairs and [`Value::Ignore`] placeholders are resolved by the row
/// comparison before a policy is consulted.
pub trait EqualityPolicy: Send + Sync + fmt::Debug {
    fn values_equal(&self, expected: &Value, actual: &Value) -> bool;
}

/// Default policy: exact equality for text, type-aware equality otherwise.
///
/// Numbers compare by decimal value across integer, decimal and float
/// representations. A date equals a datetime at midnight of that day. Text on
/// one side is re-read as the kind of the other side before comparing, so a
/// dataset literal `"2024-01-05"` matches a date column.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedEquality {
    trim_strings: bool,
}

impl TypedEquality {
    pub fn new(trim_strings: bool) -> Self {
        Self { trim_strings }
    }
}

impl EqualityPolicy for TypedEquality {
    fn values_equal(&self, expected: &Value, actual: &Value) -> bool {
        match (expected, actual) {
            (Value::Ignore, _) => true,
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::String(e), Value::String(a)) => {
                if self.trim_strings {
                    e.trim() == a.trim()
                } else {
                    e == a
                }
            }
            (Value::String(_), other) => expected
                .coerce_like(other)
                .is_some_and(|coerced| typed_equal(&coerced, other)),
            (other, Value::String(_)) => actual
                .coerce_like(other)
                .is_some_and(|coerced| typed_equal(other, &coerced)),
            _ => typed_equal(expected, actual),
        }
    }
}

fn typed_equal(left: &Value, right: &Value) -> bool {
    if left.is_numeric() && right.is_numeric() {
        return match (left.to_decimal(), right.to_decimal()) {
            (Some(l), Some(r)) => l == r,
            _ => match (left, right) {
                (Value::Float(l), Value::Float(r)) => l == r,
                _ => false,
            },
        };
    }
    match (left, right) {
        (Value::Boolean(b), Value::Integer(i)) | (Value::Integer(i), Value::Boolean(b)) => {
            *i == i64::from(*b)
        }
        (Value::Date(d), Value::DateTime(dt)) | (Value::DateTime(dt), Value::Date(d)) => {
            d.and_hms_opt(0, 0, 0).is_some_and(|midnight| midnight == *dt)
        }
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn eq(expected: impl Into<Value>, actual: impl Into<Value>) -> bool {
        TypedEquality::default().values_equal(&expected.into(), &actual.into())
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(eq(5, Decimal::new(500, 2)));
        assert!(eq(2.5, Decimal::new(25, 1)));
        assert!(!eq(5, 6));
        assert!(eq("5.00", 5));
        assert!(!eq("five", 5));
    }

    #[test]
    fn strings_are_exact_unless_trimming() {
        assert!(!eq("a ", "a"));
        assert!(!eq("A", "a"));
        assert!(TypedEquality::new(true).values_equal(&"a ".into(), &"a".into()));
    }

    #[test]
    fn dates_and_datetimes_line_up_at_midnight() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let midnight = day.and_hms_opt(0, 0, 0).unwrap();
        let noon = day.and_hms_opt(12, 0, 0).unwrap();
        assert!(eq(day, midnight));
        assert!(!eq(day, noon));
        assert!(eq("2024-01-05", day));
        assert!(eq(day, "2024-01-05"));
    }

    #[test]
    fn null_only_equals_null() {
        assert!(eq(Value::Null, Value::Null));
        assert!(!eq(Value::Null, ""));
        assert!(!eq("", Value::Null));
    }

    #[test]
    fn booleans_accept_zero_and_one() {
        assert!(eq(true, 1));
        assert!(eq(0, false));
        assert!(eq("yes", true));
    }
}
