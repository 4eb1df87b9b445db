//! Local payload checks, run before any request leaves the client.

use serde_json::{Map, Value};

use crate::{ApiError, ApiErrorKind};

/// Implemented by the per-request-shape validators. Constructing a validator
/// runs the structural check; [`Validator::validate`] runs the checks
/// specific to the shape.
pub trait Validator {
    /// Check the payload against the service's limits for this shape.
    fn validate(&self) -> Result<(), ApiError>;
}

fn invalid() -> ApiError {
    ApiError::new(
        ApiErrorKind::InvalidQuery,
        "this query has invalid keys or values",
    )
}

/// Check that `payload` is a non-empty object, and that no value anywhere in
/// it is null, an empty string, an empty object, or an empty array.
pub fn check_structure(payload: &Value) -> Result<&Map<String, Value>, ApiError> {
    let Value::Object(map) = payload else {
        return Err(invalid());
    };

    check_object(map)?;
    Ok(map)
}

fn check_object(map: &Map<String, Value>) -> Result<(), ApiError> {
    if map.is_empty() {
        return Err(invalid());
    }

    map.values().try_for_each(check_value)
}

fn check_array(values: &[Value]) -> Result<(), ApiError> {
    if values.is_empty() {
        return Err(invalid());
    }

    values.iter().try_for_each(check_value)
}

fn check_value(value: &Value) -> Result<(), ApiError> {
    match value {
        Value::Object(map) => check_object(map),
        Value::Array(values) => check_array(values),
        Value::Null => Err(invalid()),
        Value::String(s) if s.is_empty() => Err(invalid()),
        _ => Ok(()),
    }
}

/// Empty or whitespace-only.
pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// The number of keys in `map`, not counting `flag` if present.
pub(crate) fn len_without(map: &Map<String, Value>, flag: &str) -> usize {
    map.len() - usize::from(map.contains_key(flag))
}
