//! Loose scalar semantics over JSON values.
//!
//! Records are plain [`serde_json::Value`]s. Filters and comparators treat
//! them with the loose rules a JSON client expects: `null` and missing
//! members are interchangeable, `0` and `""` are falsy, and a number equals
//! its numeric string.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::{Number, Value};

/// Returns `true` for `null` or a missing member.
pub fn is_nullish(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Truthiness of a (possibly missing) value.
///
/// `null`, missing, `false`, `0`, `NaN` and `""` are falsy. Objects and
/// arrays are truthy even when empty.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Text form used by pattern tests.
///
/// Null, missing, arrays, and objects have no text form.
pub fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        _ => None,
    }
}

/// Compares two JSON numbers, handling mixed integer and float storage.
pub fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return Some(a.cmp(&b));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Orders two scalars of the same kind.
///
/// Numbers compare numerically, strings lexicographically, booleans with
/// `false < true`. Any other pairing is unordered and returns `None`.
pub fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Orders a record value against a bound, coercing numeric strings.
///
/// Like [`compare_scalars`], except that a number and a string holding a
/// number compare numerically.
pub fn compare_loose(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(n), Value::String(s)) => n.as_f64()?.partial_cmp(&s.trim().parse().ok()?),
        (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().ok()?.partial_cmp(&n.as_f64()?)
        }
        _ => compare_scalars(a, b),
    }
}

/// Loose equality between a record value and an expected value.
///
/// Same-kind scalars compare directly; a number and a numeric string compare
/// numerically. Containers are equal only when structurally identical.
pub fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match (s.trim().parse::<f64>(), n.as_f64()) {
                (Ok(parsed), Some(n)) => parsed == n,
                _ => false,
            }
        }
        _ => actual == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nullish_values() {
        assert!(is_nullish(None));
        assert!(is_nullish(Some(&Value::Null)));
        assert!(!is_nullish(Some(&json!(0))));
        assert!(!is_nullish(Some(&json!(""))));
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(0.0))));
        assert!(!is_truthy(Some(&json!(""))));

        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(-1))));
        assert!(is_truthy(Some(&json!("0"))));
        assert!(is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!({}))));
    }

    #[test]
    fn text_forms() {
        assert_eq!(as_text(&json!("abc")).as_deref(), Some("abc"));
        assert_eq!(as_text(&json!(42)).as_deref(), Some("42"));
        assert_eq!(as_text(&json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(as_text(&json!(true)).as_deref(), Some("true"));
        assert_eq!(as_text(&json!(null)), None);
        assert_eq!(as_text(&json!({"a": 1})), None);
    }

    #[test]
    fn number_comparisons_mixed_storage() {
        let int = Number::from(5);
        let uint = Number::from(u64::MAX);
        let float = Number::from_f64(5.0).unwrap();

        assert_eq!(compare_numbers(&int, &float), Some(Ordering::Equal));
        assert_eq!(compare_numbers(&int, &uint), Some(Ordering::Less));
        assert_eq!(
            compare_numbers(&Number::from(-3), &Number::from(2)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn scalar_ordering() {
        assert_eq!(
            compare_scalars(&json!("apple"), &json!("banana")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_scalars(&json!(20), &json!(10)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_scalars(&json!(false), &json!(true)),
            Some(Ordering::Less)
        );
        assert_eq!(compare_scalars(&json!("1"), &json!(1)), None);
        assert_eq!(compare_scalars(&json!(null), &json!(1)), None);
    }

    #[test]
    fn loose_ordering_coerces_numeric_strings() {
        assert_eq!(
            compare_loose(&json!("70"), &json!(60)),
            Some(Ordering::Greater)
        );
        assert_eq!(compare_loose(&json!(5), &json!("5.0")), Some(Ordering::Equal));
        assert_eq!(compare_loose(&json!("abc"), &json!(5)), None);
        assert_eq!(
            compare_loose(&json!("a"), &json!("b")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn loose_equality() {
        assert!(loose_eq(&json!(5), &json!(5.0)));
        assert!(loose_eq(&json!("5"), &json!(5)));
        assert!(loose_eq(&json!(5), &json!("5")));
        assert!(loose_eq(&json!("x"), &json!("x")));
        assert!(!loose_eq(&json!("x"), &json!("X")));
        assert!(!loose_eq(&json!("five"), &json!(5)));
        assert!(!loose_eq(&json!(true), &json!("true")));
    }
}
