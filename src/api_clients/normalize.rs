//! # Response Normalization
//!
//! The one place where wire-level failure shapes become [`ClientError`]s.
//! Server error bodies arrive either as `{"message": "..."}`, as
//! `{"errors": {...}}` or as something else entirely (proxy pages, empty
//! bodies). Callers above this module only ever see an [`ErrorKind`].
//!
//! [`ErrorKind`]: crate::error::ErrorKind

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{ClientError, ClientResult};

/// Classify a non-2xx response body.
///
/// A non-empty `message` wins over `errors`, matching what the registration
/// service puts first when it sends both.
pub fn error_from_body(operation: &str, status: StatusCode, body: &str) -> ClientError {
    let parsed = serde_json::from_str::<Value>(body).ok();

    if let Some(Value::Object(fields)) = &parsed {
        if let Some(message) = fields
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
        {
            return ClientError::business(Some(status.as_u16()), message);
        }

        if let Some(errors) = fields.get("errors") {
            let messages = validation_messages(errors);
            if !messages.is_empty() {
                return ClientError::Validation(messages);
            }
        }
    }

    let detail = if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body.trim())
    };
    ClientError::transport(operation, detail)
}

/// Flatten a field→message map (or a plain list) into display strings
fn validation_messages(errors: &Value) -> Vec<String> {
    let values: Vec<&Value> = match errors {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        Value::String(_) => vec![errors],
        _ => Vec::new(),
    };

    values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Null => None,
            Value::String(_) => None,
            other => Some(other.to_string()),
        })
        .collect()
}

/// Map a failure to reach the server at all
pub fn error_from_request(operation: &str, err: &reqwest::Error) -> ClientError {
    error!(operation = %operation, error = %err, "Request to registration API failed");
    ClientError::transport(operation, err.to_string())
}

/// Decode a 2xx body, reporting malformed payloads as transport failures
pub fn decode_body<T>(operation: &str, body: &str) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str::<T>(body).map_err(|e| {
        debug!(operation = %operation, error = %e, "Failed to parse response body");
        ClientError::transport(operation, format!("Failed to parse response: {}", e))
    })
}

/// Turn a decoded `success: false` envelope into a business error
pub fn reject_unsuccessful(success: bool, message: &str, fallback: &str) -> ClientResult<()> {
    if success {
        return Ok(());
    }
    let message = if message.trim().is_empty() {
        fallback
    } else {
        message
    };
    Err(ClientError::business(None, message))
}
