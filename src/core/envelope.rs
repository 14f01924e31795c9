//! Purpose: Wire envelopes for the JSON-RPC style API.
//! Exports: `Request`, `Response`, `RemoteErrorEntry`, `next_request_id`.
//! Role: Encodes `{method, params, id}` and decodes `{result, error, id, callCount, queryLimit}`.
//! Invariants: Request ids are unique for the life of the process.
//! Invariants: A response is an error iff its error list is non-empty; then `result` is ignored.
//! Invariants: Bodies that are not JSON objects with `result` or `error` fail to decode.
#![allow(clippy::result_large_err)]

use super::error::{Error, ErrorKind};
use super::record::json_type_name;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(0);

/// Timestamp in microseconds plus a process-wide counter, in hex.
pub fn next_request_id() -> String {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_micros())
        .unwrap_or_default();
    let seq = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{micros:x}-{seq:x}")
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Request {
    method: String,
    params: Map<String, Value>,
    id: String,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            params,
            id: next_request_id(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn encode(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode request json")
                .with_method(self.method.clone())
                .with_source(err)
        })
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RemoteErrorEntry {
    #[serde(default, deserialize_with = "lenient_message")]
    pub message: String,
    #[serde(default)]
    pub code: Value,
    #[serde(default)]
    pub data: Value,
}

impl RemoteErrorEntry {
    pub fn code(&self) -> Option<i64> {
        match &self.code {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    method: String,
    request_id: String,
    body: Map<String, Value>,
    errors: Vec<RemoteErrorEntry>,
}

impl Response {
    pub fn decode(request: &Request, raw: &str) -> Result<Self, Error> {
        let decode_error = |message: String| {
            Error::new(ErrorKind::Decode)
                .with_message(message)
                .with_method(request.method().to_string())
        };

        let value: Value = serde_json::from_str(raw).map_err(|err| {
            Error::new(ErrorKind::Decode)
                .with_message("response is not valid json")
                .with_method(request.method().to_string())
                .with_source(err)
        })?;
        let body = match value {
            Value::Object(body) => body,
            other => {
                return Err(decode_error(format!(
                    "response body must be an object, found {}",
                    json_type_name(&other)
                )));
            }
        };
        if !body.contains_key("result") && !body.contains_key("error") {
            return Err(decode_error(
                "response carries neither result nor error".to_string(),
            ));
        }
        let errors = parse_errors(body.get("error")).map_err(decode_error)?;

        Ok(Self {
            method: request.method().to_string(),
            request_id: request.id().to_string(),
            body,
            errors,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// The `result` member; `Null` when absent.
    pub fn result(&self) -> &Value {
        self.body.get("result").unwrap_or(&Value::Null)
    }

    pub fn into_result(mut self) -> Value {
        self.body.remove("result").unwrap_or(Value::Null)
    }

    pub fn errors(&self) -> &[RemoteErrorEntry] {
        &self.errors
    }

    pub fn id(&self) -> Option<&Value> {
        self.body.get("id").filter(|value| !value.is_null())
    }

    /// True when the echoed id is absent or matches the request.
    pub fn id_matches(&self) -> bool {
        match self.id() {
            None => true,
            Some(Value::String(id)) => id == &self.request_id,
            Some(_) => false,
        }
    }

    pub fn call_count(&self) -> Option<u64> {
        self.body.get("callCount").and_then(as_count)
    }

    pub fn query_limit(&self) -> Option<u64> {
        self.body.get("queryLimit").and_then(as_count)
    }

    pub fn is_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Structured error built from the first entry of the error list.
    pub fn make_error(&self) -> Error {
        let mut err = Error::new(ErrorKind::Remote).with_method(self.method.clone());
        let Some(first) = self.errors.first() else {
            return err.with_message("remote call failed without error details");
        };
        err = if first.message.is_empty() {
            err.with_message("remote call failed")
        } else {
            err.with_message(first.message.clone())
        };
        if let Some(code) = first.code() {
            err = err.with_code(code);
        }
        if !first.data.is_null() {
            err = err.with_data(first.data.clone());
        }
        err
    }
}

fn parse_errors(raw: Option<&Value>) -> Result<Vec<RemoteErrorEntry>, String> {
    let entries = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(entry)) if entry.is_empty() => return Ok(Vec::new()),
        Some(entry @ Value::Object(_)) => vec![entry.clone()],
        Some(other) => {
            return Err(format!(
                "error member must be an array or object, found {}",
                json_type_name(other)
            ));
        }
    };
    entries
        .into_iter()
        .map(|entry| {
            serde_json::from_value(entry).map_err(|err| format!("malformed error entry: {err}"))
        })
        .collect()
}

/// Null becomes empty; non-string messages keep their JSON text.
fn lenient_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}
