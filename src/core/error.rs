//! Purpose: Single structured error type for every client failure path.
//! Exports: `Error`, `ErrorKind`, `to_exit_code`.
//! Role: Shared by record marshaling, envelopes, transports, and the CLI.
//! Invariants: Remote API errors keep the server's message, code, and opaque data.
//! Invariants: Exit codes are stable once published.
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    /// Caller input rejected before any network activity.
    Usage,
    /// The transport failed to produce a response.
    Transport,
    /// The response bytes were not a usable envelope.
    Decode,
    /// The server answered with a non-empty error list.
    Remote,
    /// The decoded result did not have the shape the operation expects.
    Cast,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    method: Option<String>,
    code: Option<i64>,
    data: Option<Value>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            method: None,
            code: None,
            data: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// API method of the call that failed, when known.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Numeric error code reported by the server.
    pub fn code(&self) -> Option<i64> {
        self.code
    }

    /// Opaque diagnostic payload attached by the server.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Keyed access into the server-provided `data` object.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data
            .as_ref()
            .and_then(|data| data.get(key))
            .filter(|value| !value.is_null())
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(code) = self.code {
            write!(f, " (code: {code})")?;
        }
        if let Some(method) = &self.method {
            write!(f, " (method: {method})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Transport => 3,
        ErrorKind::Decode => 4,
        ErrorKind::Remote => 5,
        ErrorKind::Cast => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, to_exit_code};
    use serde_json::json;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::Transport, 3),
            (ErrorKind::Decode, 4),
            (ErrorKind::Remote, 5),
            (ErrorKind::Cast, 6),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn data_field_reads_keys_and_skips_nulls() {
        let err = Error::new(ErrorKind::Remote)
            .with_message("Invalid parameters")
            .with_code(205)
            .with_data(json!({"params": ["limit"], "missing": null}));

        assert_eq!(err.data_field("params"), Some(&json!(["limit"])));
        assert_eq!(err.data_field("missing"), None);
        assert_eq!(err.data_field("absent"), None);
    }

    #[test]
    fn display_includes_code_and_method() {
        let err = Error::new(ErrorKind::Remote)
            .with_message("Invalid ID")
            .with_code(301)
            .with_method("getLead");
        assert_eq!(
            err.to_string(),
            "Remote: Invalid ID (code: 301) (method: getLead)"
        );
    }
}
