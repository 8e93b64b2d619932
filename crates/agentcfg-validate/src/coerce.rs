//! # Permissive Primitive Coercers
//!
//! Configuration values arrive from environment variables and database rows
//! as strings, and from computations as native JSON values. The coercers in
//! this module accept both representations and normalise them to a single
//! canonical JSON value.
//!
//! ## Tolerance Rules
//!
//! | Coercer | Accepts | Rejects |
//! |---------|---------|---------|
//! | number | JSON numbers, strings that parse *in full* as a finite number | `""`, `" 42"`, `"4x2"`, `"NaN"`, `null`, booleans |
//! | boolean | JSON booleans, exactly `"true"` / `"false"` | `"TRUE"`, `"1"`, `1`, `"yes"`, `null` |
//!
//! There is no general truthiness for booleans.
//!
//! ## Number Normalisation
//!
//! Integral values are stored as JSON integers, so `42`, `"42"`, `42.0` and
//! `"42.0"` all decode to the same value.

use crate::error::{Expected, FieldPath, Result, ValidationError};
use serde_json::{Number, Value};

/// 2^63: integral `f64`s in `[-2^63, 2^63)` fit an `i64` exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// 2^64: non-negative integral `f64`s below it fit a `u64` exactly.
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// Decodes a number or numeric string into a canonical JSON number.
///
/// # Errors
///
/// Returns [`ValidationError::Coercion`] with [`Expected::Number`] for any
/// other value, or for strings that do not parse in full.
///
/// # Example
///
/// ```rust
/// use agentcfg_validate::coerce::permissive_number;
/// use agentcfg_validate::FieldPath;
/// use serde_json::json;
///
/// let root = FieldPath::root();
/// assert_eq!(permissive_number(&json!("48484"), &root).unwrap(), json!(48484));
/// assert_eq!(permissive_number(&json!(48484), &root).unwrap(), json!(48484));
/// assert!(permissive_number(&json!("4x2"), &root).is_err());
/// ```
pub fn permissive_number(raw: &Value, path: &FieldPath) -> Result<Value> {
    match raw {
        Value::Number(n) => Ok(Value::Number(normalize(n))),
        Value::String(text) => parse_number(text)
            .map(Value::Number)
            .ok_or_else(|| ValidationError::coercion(path, Expected::Number, raw)),
        _ => Err(ValidationError::coercion(path, Expected::Number, raw)),
    }
}

/// Decodes a boolean or the exact strings `"true"` / `"false"`.
///
/// # Errors
///
/// Returns [`ValidationError::Coercion`] with [`Expected::Boolean`] for
/// anything else.
pub fn permissive_boolean(raw: &Value, path: &FieldPath) -> Result<Value> {
    match raw {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(text) if text == "true" => Ok(Value::Bool(true)),
        Value::String(text) if text == "false" => Ok(Value::Bool(false)),
        _ => Err(ValidationError::coercion(path, Expected::Boolean, raw)),
    }
}

/// Parses the whole of `text` as a finite number.
///
/// Returns `None` on partial parses, surrounding whitespace, the empty string
/// and non-finite values (`inf`, `NaN`).
pub fn parse_number(text: &str) -> Option<Number> {
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::from(u));
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    let f = text.parse::<f64>().ok()?;
    if !f.is_finite() {
        return None;
    }
    Some(normalize_float(f))
}

/// Rewrites integral floats as integers; other numbers are returned unchanged.
pub fn normalize(n: &Number) -> Number {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            return normalize_float(f);
        }
    }
    n.clone()
}

fn normalize_float(f: f64) -> Number {
    if f.fract() == 0.0 {
        // `-0.0` lands on 0.
        if f >= -I64_BOUND && f < I64_BOUND {
            return Number::from(f as i64);
        }
        if f > 0.0 && f < U64_BOUND {
            return Number::from(f as u64);
        }
    }
    // Finite floats always convert.
    Number::from_f64(f).unwrap_or_else(|| Number::from(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(raw: Value) -> Result<Value> {
        permissive_number(&raw, &FieldPath::root())
    }

    fn boolean(raw: Value) -> Result<Value> {
        permissive_boolean(&raw, &FieldPath::root())
    }

    #[test]
    fn test_number_accepts_number_and_numeric_string() {
        assert_eq!(num(json!("42")).unwrap(), json!(42));
        assert_eq!(num(json!(42)).unwrap(), json!(42));
        assert_eq!(num(json!("-7")).unwrap(), json!(-7));
        assert_eq!(num(json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(num(json!("1e3")).unwrap(), json!(1000));
    }

    #[test]
    fn test_number_normalises_integral_floats() {
        assert_eq!(num(json!(42.0)).unwrap(), json!(42));
        assert_eq!(num(json!("42.0")).unwrap(), num(json!(42)).unwrap());
        assert_eq!(num(json!("-0.0")).unwrap(), json!(0));
    }

    #[test]
    fn test_number_rejects_partial_and_empty() {
        for raw in [json!("4x2"), json!(""), json!(" 42"), json!("42 "), json!("0x10")] {
            let err = num(raw.clone()).unwrap_err();
            assert!(err.is_coercion(), "{raw} should fail coercion");
        }
    }

    #[test]
    fn test_number_rejects_non_finite_strings() {
        for raw in ["NaN", "inf", "-infinity", "Infinity"] {
            assert!(num(json!(raw)).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_number_rejects_other_types() {
        for raw in [json!(null), json!(true), json!([1]), json!({"n": 1})] {
            match num(raw.clone()).unwrap_err() {
                ValidationError::Coercion { expected, raw: got, .. } => {
                    assert_eq!(expected, Expected::Number);
                    assert_eq!(got, raw);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_number_keeps_large_unsigned() {
        assert_eq!(num(json!("18446744073709551615")).unwrap(), json!(u64::MAX));
    }

    #[test]
    fn test_number_normalises_integral_floats_above_i64() {
        let expected = json!(10_000_000_000_000_000_000u64);
        assert_eq!(num(json!("1e19")).unwrap(), expected);
        assert_eq!(num(json!(1e19)).unwrap(), expected);
        assert_eq!(num(json!("10000000000000000000")).unwrap(), expected);
        assert_eq!(num(json!("9223372036854775808.0")).unwrap(), json!(1u64 << 63));
    }

    #[test]
    fn test_number_keeps_integral_floats_beyond_u64_as_floats() {
        let decoded = num(json!("1e20")).unwrap();
        assert!(decoded.is_f64());
        assert_eq!(decoded.as_f64(), Some(1e20));
    }

    #[test]
    fn test_boolean_accepts_exact_forms() {
        assert_eq!(boolean(json!("true")).unwrap(), json!(true));
        assert_eq!(boolean(json!("false")).unwrap(), json!(false));
        assert_eq!(boolean(json!(true)).unwrap(), json!(true));
        assert_eq!(boolean(json!(false)).unwrap(), json!(false));
    }

    #[test]
    fn test_boolean_has_no_general_truthiness() {
        for raw in [
            json!("TRUE"),
            json!("False"),
            json!(1),
            json!(0),
            json!("1"),
            json!("yes"),
            json!(""),
            json!(null),
        ] {
            let err = boolean(raw.clone()).unwrap_err();
            assert!(err.is_coercion(), "{raw} should fail coercion");
        }
    }
}
