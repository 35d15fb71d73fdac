//! Helpers for reading typed values out of a JSON configuration object.
//!
//! Each helper takes a JSON value, a key and a default. A missing key (or an
//! explicit `null`) yields the default. A key that is present with the wrong
//! JSON type, or a number outside the target type's range, is an
//! `EngineError::InvalidParam`; range checks beyond that are left to the
//! config struct that owns the key.

use crate::error::EngineError;
use serde_json::Value;

fn lookup<'a>(params: &'a Value, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

fn wrong_type(name: &str, expected: &str, found: &Value) -> EngineError {
    EngineError::InvalidParam {
        name: name.to_string(),
        reason: format!("expected {expected}, got {found}"),
    }
}

fn read<T>(
    params: &Value,
    name: &str,
    default: T,
    expected: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Result<T, EngineError> {
    match lookup(params, name) {
        None => Ok(default),
        Some(v) => convert(v).ok_or_else(|| wrong_type(name, expected, v)),
    }
}

/// Reads an `f64`, accepting integers too.
pub fn param_f64(params: &Value, name: &str, default: f64) -> Result<f64, EngineError> {
    read(params, name, default, "a number", Value::as_f64)
}

/// Reads a signed integer. Floats are rejected, not truncated.
pub fn param_i64(params: &Value, name: &str, default: i64) -> Result<i64, EngineError> {
    read(params, name, default, "an integer", Value::as_i64)
}

/// Reads a non-negative integer that fits in `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> Result<usize, EngineError> {
    read(params, name, default, "a non-negative integer", |v| {
        v.as_u64().and_then(|n| usize::try_from(n).ok())
    })
}

/// Reads a `u64`, used for PRNG seeds.
pub fn param_u64(params: &Value, name: &str, default: u64) -> Result<u64, EngineError> {
    read(params, name, default, "a non-negative integer", Value::as_u64)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> Result<String, EngineError> {
    read(params, name, default.to_owned(), "a string", |v| {
        v.as_str().map(String::from)
    })
}
