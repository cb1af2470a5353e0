//! Response normalisation shared by every transport

use super::Operation;
use serde_json::Value;
use triage_types::{Envelope, ErrorCode, Failure};

/// Normalise a raw HTTP response into an envelope
pub fn normalize_response(operation: Operation, status: u16, body: &[u8]) -> Envelope<Value> {
    let is_blank = body.iter().all(u8::is_ascii_whitespace);

    let parsed = if is_blank {
        None
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Some(value),
            Err(e) if is_success(status) => {
                log::warn!("{} returned invalid JSON: {}", operation.name(), e);
                return Envelope::error(
                    ErrorCode::DecodeFailure,
                    format!("Invalid JSON in {} response: {}", operation.name(), e),
                );
            }
            // Error bodies that are not JSON only lose their message
            Err(_) => None,
        }
    };

    normalize_json(operation, status, parsed)
}

/// Normalise an already decoded response body
pub fn normalize_json(operation: Operation, status: u16, body: Option<Value>) -> Envelope<Value> {
    if is_success(status) {
        return match body {
            None => Envelope::success(Value::Null),
            Some(value) => success_body(operation, value),
        };
    }

    if status == 404 && operation.absent_is_empty() {
        log::debug!("{} found nothing; treating as empty", operation.name());
        return Envelope::success(Value::Null);
    }

    let message = body
        .as_ref()
        .and_then(server_message)
        .unwrap_or_else(|| format!("Request failed with status {}", status));

    let error_code = body
        .as_ref()
        .and_then(server_code)
        .unwrap_or_else(|| {
            if status == 404 {
                operation.not_found_code()
            } else {
                ErrorCode::Http(status)
            }
        });

    Envelope::Error(Failure::new(error_code, message))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Pass envelopes through, wrap bare resources
fn success_body(operation: Operation, value: Value) -> Envelope<Value> {
    let envelope_status = value
        .get("status")
        .and_then(Value::as_str)
        .filter(|status| matches!(*status, "success" | "error"));

    if envelope_status.is_none() {
        return Envelope::success(value);
    }

    match serde_json::from_value::<Envelope<Value>>(value) {
        Ok(Envelope::Error(failure))
            if operation.absent_is_empty()
                && failure.kind() == triage_types::ErrorKind::NotFound =>
        {
            Envelope::success(Value::Null)
        }
        Ok(envelope) => envelope,
        Err(e) => Envelope::error(
            ErrorCode::DecodeFailure,
            format!("Malformed envelope in {} response: {}", operation.name(), e),
        ),
    }
}

fn server_message(body: &Value) -> Option<String> {
    ["message", "detail"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn server_code(body: &Value) -> Option<ErrorCode> {
    body.get("error_code")
        .filter(|code| !code.is_null())
        .and_then(|code| serde_json::from_value(code.clone()).ok())
}
