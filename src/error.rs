// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for hostdom
//!
//! Errors fall into three groups. Host errors mean the gateway call failed or the
//! host rejected the operation; they are propagated unchanged. Usage errors are
//! raised locally before any gateway call is made. Not-found is never an error:
//! it is expressed as `None`.

use thiserror::Error;

/// Result type alias for hostdom operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hostdom
#[derive(Error, Debug)]
pub enum Error {
    /// The host reported a failure for an operation
    #[error("Host error in {op}: {message}")]
    Host { op: String, message: String },

    /// The host replied with a value of the wrong shape
    #[error("Unexpected reply to {op}: expected {expected}, got {got}")]
    Protocol {
        op: String,
        expected: &'static str,
        got: String,
    },

    /// The gateway stream ended before a reply arrived
    #[error("Gateway closed")]
    GatewayClosed,

    /// Local misuse of the runtime API
    #[error("Usage error: {0}")]
    Usage(String),

    /// HTTP request failed
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTML parsing failed
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// Selector parsing error
    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a host error for an operation
    pub fn host(op: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Host {
            op: op.into(),
            message: message.into(),
        }
    }

    /// Create a usage error
    pub fn usage<S: Into<String>>(msg: S) -> Self {
        Error::Usage(msg.into())
    }

    /// Create a protocol error for a malformed reply
    pub fn protocol(op: impl Into<String>, expected: &'static str, got: impl Into<String>) -> Self {
        Error::Protocol {
            op: op.into(),
            expected,
            got: got.into(),
        }
    }

    /// Create a selector error
    pub fn selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Selector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a usage error (raised before touching the gateway)
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }

    /// Check if this error came from the host side of the gateway
    pub fn is_host(&self) -> bool {
        match self {
            Error::Host { .. }
            | Error::Protocol { .. }
            | Error::GatewayClosed
            | Error::Io(_)
            | Error::Serialization(_) => true,
            #[cfg(feature = "http")]
            Error::Http(_) => true,
            _ => false,
        }
    }

    /// Get the operation name if available
    pub fn op(&self) -> Option<&str> {
        match self {
            Error::Host { op, .. } | Error::Protocol { op, .. } => Some(op),
            _ => None,
        }
    }

    /// Convert into a host error for `op`, keeping existing host errors intact
    pub(crate) fn into_host(self, op: &str) -> Self {
        match self {
            err @ (Error::Host { .. } | Error::Protocol { .. } | Error::GatewayClosed) => err,
            other => Error::host(op, other.to_string()),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error() {
        let err = Error::host("querySelector", "invalid selector");

        assert!(err.is_host());
        assert!(!err.is_usage());
        assert_eq!(err.op(), Some("querySelector"));
        assert_eq!(
            err.to_string(),
            "Host error in querySelector: invalid selector"
        );
    }

    #[test]
    fn test_usage_error() {
        let err = Error::usage("asynchronous requests are not supported");
        assert!(err.is_usage());
        assert!(!err.is_host());
        assert_eq!(err.op(), None);
    }

    #[test]
    fn test_into_host_keeps_host_errors() {
        let err = Error::host("removeChild", "unknown handle 7").into_host("other");
        assert_eq!(err.op(), Some("removeChild"));

        let err = Error::selector("a[", "Expected ']'").into_host("querySelector");
        assert_eq!(err.op(), Some("querySelector"));
        assert!(err.to_string().contains("Invalid selector 'a['"));
    }

    #[test]
    fn test_context() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = res.context("reading page").unwrap_err();
        assert!(err.to_string().starts_with("reading page: "));
    }
}
