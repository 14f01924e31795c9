//! Purpose: The blocking transport seam and its default HTTP implementation.
//! Exports: `Transport`, `HttpTransport`.
//! Role: Posts encoded envelopes to the endpoint and hands back raw response text.
//! Invariants: No retries; every failure is returned to the caller as-is.
//! Invariants: Non-2xx bodies are passed through only when they carry a non-empty error member.
#![allow(clippy::result_large_err)]

use super::config::ClientConfig;
use crate::core::error::{Error, ErrorKind};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Synchronous request/response channel to the API.
pub trait Transport {
    fn send(&self, endpoint: &Url, payload: &str) -> Result<String, Error>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, endpoint: &Url, payload: &str) -> Result<String, Error> {
        (**self).send(endpoint, payload)
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.timeout())
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    /// Plain GET, used by form submissions.
    pub fn get(&self, url: &Url) -> Result<String, Error> {
        let response = self.agent.get(url.as_str()).call();
        match response {
            Ok(resp) => read_body(resp),
            Err(ureq::Error::Status(code, _resp)) => Err(Error::new(ErrorKind::Transport)
                .with_message(format!("http status {code}"))),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Transport)
                .with_message("request failed")
                .with_source(err)),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Transport for HttpTransport {
    fn send(&self, endpoint: &Url, payload: &str) -> Result<String, Error> {
        let response = self
            .agent
            .post(endpoint.as_str())
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .send_string(payload);

        match response {
            Ok(resp) => read_body(resp),
            Err(ureq::Error::Status(code, resp)) => status_error_body(code, resp),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Transport)
                .with_message("request failed")
                .with_source(err)),
        }
    }
}

fn read_body(response: ureq::Response) -> Result<String, Error> {
    response.into_string().map_err(|err| {
        Error::new(ErrorKind::Transport)
            .with_message("failed to read response body")
            .with_source(err)
    })
}

fn status_error_body(status: u16, response: ureq::Response) -> Result<String, Error> {
    let body = response.into_string().unwrap_or_default();
    if carries_error_envelope(&body) {
        return Ok(body);
    }
    let hint = match status {
        401 | 403 => "Check the account id and secret key.",
        404 => "Check the base url and api version.",
        500..=599 => "The API reported a server-side failure; try again later.",
        _ => "Unexpected http status from the API.",
    };
    Err(Error::new(ErrorKind::Transport)
        .with_message(format!("http status {status}"))
        .with_hint(hint))
}

/// True when the body's `error` member would decode as a remote failure.
fn carries_error_envelope(body: &str) -> bool {
    let Ok(Value::Object(envelope)) = serde_json::from_str::<Value>(body) else {
        return false;
    };
    match envelope.get("error") {
        Some(Value::Array(entries)) => !entries.is_empty(),
        Some(Value::Object(entry)) => !entry.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::carries_error_envelope;

    #[test]
    fn only_non_empty_error_members_count_as_envelopes() {
        assert!(carries_error_envelope(r#"{"error":[{"code":101,"message":"x"}]}"#));
        assert!(carries_error_envelope(r#"{"result":null,"error":{"code":101}}"#));
        assert!(!carries_error_envelope(r#"{"result":null,"error":[]}"#));
        assert!(!carries_error_envelope(r#"{"result":null,"error":{}}"#));
        assert!(!carries_error_envelope(r#"{"result":null,"error":null}"#));
        assert!(!carries_error_envelope(r#"{"error":"boom"}"#));
        assert!(!carries_error_envelope("Service Unavailable"));
    }
}
