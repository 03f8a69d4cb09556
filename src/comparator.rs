//! Ordering and equality over JSON values as used by SCIM comparison filters.
//!
//! Numbers compare numerically whatever their JSON representation. Strings
//! compare case-insensitively, except that two RFC 3339 timestamps compare
//! chronologically. Values of different JSON types are never equal and have
//! no order.

use chrono::{DateTime, FixedOffset};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Three-way comparison of two JSON scalars, or `None` if they cannot be
/// ordered against each other.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    compare_with(a, b, false)
}

/// [`compare`] with optional case-exact string comparison.
pub fn compare_with(a: &Value, b: &Value, case_exact: bool) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => Some(compare_strings(x, y, case_exact)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Equality of two JSON values. Scalars use [`compare`]; arrays and objects
/// are equal when structurally equal, member by member.
pub fn equals(a: &Value, b: &Value) -> bool {
    equals_with(a, b, false)
}

/// [`equals`] with optional case-exact string comparison.
pub fn equals_with(a: &Value, b: &Value, case_exact: bool) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| equals_with(a, b, case_exact))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, a)| {
                    y.get(key).is_some_and(|b| equals_with(a, b, case_exact))
                })
        }
        _ => compare_with(a, b, case_exact) == Some(Ordering::Equal),
    }
}

fn compare_numbers(x: &Number, y: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return Some(a.cmp(&b));
    }
    x.as_f64()?.partial_cmp(&y.as_f64()?)
}

fn compare_strings(x: &str, y: &str, case_exact: bool) -> Ordering {
    if let (Some(a), Some(b)) = (parse_timestamp(x), parse_timestamp(y)) {
        return a.cmp(&b);
    }
    if case_exact {
        x.cmp(y)
    } else {
        x.to_lowercase().cmp(&y.to_lowercase())
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::<FixedOffset>::parse_from_rfc3339(value).ok()
}
