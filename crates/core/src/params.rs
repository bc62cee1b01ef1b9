//! Helpers for reading field parameters out of a `serde_json::Value` object.
//!
//! Every reader falls back to its default only when the key is missing or
//! `null`; a value that is present but unusable is an error, so a negative
//! particle count or a mistyped flag fails at construction instead of
//! rendering nonsense. [`check_range`] enforces the bounds each field
//! advertises in its parameter schema.

use crate::error::FieldError;
use serde_json::Value;

/// Reads a boolean. Missing or `null` yields `None`.
pub fn require_bool(params: &Value, name: &str) -> Result<Option<bool>, FieldError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(mismatch(name, "boolean", other)),
    }
}

/// Reads a string. Missing or `null` yields `None`.
pub fn require_str<'a>(params: &'a Value, name: &str) -> Result<Option<&'a str>, FieldError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(mismatch(name, "string", other)),
    }
}

/// Reads a count. Missing or `null` yields `default`; anything other than a
/// non-negative integer is an error.
pub fn require_count(params: &Value, name: &str, default: usize) -> Result<usize, FieldError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| FieldError::config(name, format!("expected a non-negative integer, got {n}"))),
        Some(other) => Err(mismatch(name, "non-negative integer", other)),
    }
}

/// Reads a finite number. Missing or `null` yields `default`.
pub fn require_finite(params: &Value, name: &str, default: f64) -> Result<f64, FieldError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FieldError::config(name, format!("expected a finite number, got {n}"))),
        Some(other) => Err(mismatch(name, "number", other)),
    }
}

/// Reads a strictly positive finite number. Missing or `null` yields `default`.
pub fn require_positive(params: &Value, name: &str, default: f64) -> Result<f64, FieldError> {
    let v = require_finite(params, name, default)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(FieldError::config(name, format!("must be greater than zero, got {v}")))
    }
}

/// Rejects `value` outside `[min, max]`.
pub fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), FieldError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(FieldError::config(name, format!("must be in [{min}, {max}], got {value}")))
    }
}

/// Rejects a count above `max`.
pub fn check_count(name: &str, value: usize, max: usize) -> Result<(), FieldError> {
    if value <= max {
        Ok(())
    } else {
        Err(FieldError::config(name, format!("must be at most {max}, got {value}")))
    }
}

/// Short JSON type name used in mismatch errors.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(name: &str, expected: &str, got: &Value) -> FieldError {
    FieldError::ParamTypeMismatch {
        name: name.to_owned(),
        expected: expected.to_owned(),
        got: json_type_name(got).to_owned(),
    }
}
