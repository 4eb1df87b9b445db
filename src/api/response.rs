use serde::Deserialize as _;
use serde_json::Value;

use super::{ApiError, ApiErrorKind, RawApiError};

/// Check a parsed response body for an embedded error object. Only the first
/// entry of `errors` is reported. A body without `errors` is a success; its
/// shape is not otherwise inspected.
pub fn check_response(body: &Value) -> Result<(), ApiError> {
    let Some(errors) = body.get("errors") else {
        return Ok(());
    };

    let Some(first) = errors.get(0) else {
        return Err(ApiError::new(
            ApiErrorKind::Service,
            format!("malformed error list: {errors}"),
        ));
    };

    match RawApiError::deserialize(first) {
        Ok(raw) => Err(ApiError::from_raw(raw)),
        Err(e) => {
            tracing::error!("Failed to parse API error: {e:#?}");
            Err(ApiError::new(
                ApiErrorKind::Service,
                format!("malformed error object: {first}"),
            ))
        }
    }
}

/// Parse a raw response body and check it with [`check_response`].
pub fn parse_response(body: &str) -> Result<Value, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to parse API response: {e:#?}");
        ApiError::with_source(ApiErrorKind::InvalidResponse, e)
    })?;

    check_response(&value)?;
    Ok(value)
}
