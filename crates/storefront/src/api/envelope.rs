//! Response envelope decoding.

use reqwest::StatusCode;
use serde_json::{Map, Value};

use super::ApiError;

/// Decode an envelope into its `data` member.
///
/// Returns `Ok(None)` for a 2xx response with an empty body or no `data`.
pub(super) fn open(status: StatusCode, body: &str) -> Result<Option<Value>, ApiError> {
    if body.trim().is_empty() {
        return if status.is_success() {
            Ok(None)
        } else {
            Err(rejected(status, None))
        };
    }

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => return Err(rejected(status, None)),
        Err(e) => return Err(ApiError::Malformed(format!("body is not JSON: {e}"))),
    };

    let Value::Object(mut object) = value else {
        return if status.is_success() {
            Err(ApiError::Malformed("body is not a JSON object".to_string()))
        } else {
            Err(rejected(status, None))
        };
    };

    let success = object.get("success").and_then(success_flag);
    if !status.is_success() || success == Some(false) {
        return Err(rejected(status, server_message(&object)));
    }

    if success.is_none() {
        return Err(ApiError::Malformed(
            "envelope has no success flag".to_string(),
        ));
    }

    Ok(object.remove("data").filter(|data| !data.is_null()))
}

fn rejected(status: StatusCode, message: Option<String>) -> ApiError {
    // `success: false` on a 2xx still counts as a client-side rejection
    let status = if status.is_success() {
        StatusCode::BAD_REQUEST
    } else {
        status
    };

    ApiError::Rejected {
        status,
        message: message.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
    }
}

fn success_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    }
}

fn server_message(object: &Map<String, Value>) -> Option<String> {
    object
        .get("message")
        .and_then(flatten)
        .or_else(|| object.get("detail").and_then(flatten))
}

/// Flatten a message into one line.
///
/// Validation errors arrive as `{"field": ["problem", ...]}` and become
/// `field: problem, ...; other: ...`.
fn flatten(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(flatten)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(fields) => fields
            .iter()
            .filter_map(|(field, errors)| {
                let errors = flatten(errors)?;
                Some(if field == "non_field_errors" {
                    errors
                } else {
                    format!("{field}: {errors}")
                })
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    };

    (!text.is_empty()).then_some(text)
}
