use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed set of failure categories surfaced by the DNS transport engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DnsErrorKind {
    PlatformUnsupported,
    NetworkUnavailable,
    ServerUnreachable,
    Timeout,
    InvalidResponse,
    PermissionDenied,
    QueryFailed,
}

impl DnsErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformUnsupported => "PlatformUnsupported",
            Self::NetworkUnavailable => "NetworkUnavailable",
            Self::ServerUnreachable => "ServerUnreachable",
            Self::Timeout => "Timeout",
            Self::InvalidResponse => "InvalidResponse",
            Self::PermissionDenied => "PermissionDenied",
            Self::QueryFailed => "QueryFailed",
        }
    }
}

impl fmt::Display for DnsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RATE_LIMIT_PREFIX: &str = "Rate limit exceeded";
const NO_RECORDS_PREFIX: &str = "No TXT records found";

/// The single error type handed to collaborators: a kind plus a human-readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct DnsError {
    pub kind: DnsErrorKind,
    pub message: String,
}

impl DnsError {
    pub fn new(kind: DnsErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn platform_unsupported(message: impl Into<String>) -> Self {
        Self::new(DnsErrorKind::PlatformUnsupported, message)
    }

    pub fn network_unavailable(message: impl Into<String>) -> Self {
        Self::new(DnsErrorKind::NetworkUnavailable, message)
    }

    pub fn server_unreachable(message: impl Into<String>) -> Self {
        Self::new(DnsErrorKind::ServerUnreachable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(DnsErrorKind::Timeout, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(DnsErrorKind::InvalidResponse, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(DnsErrorKind::PermissionDenied, message)
    }

    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::new(DnsErrorKind::QueryFailed, message)
    }

    pub fn rate_limited(max_queries: usize, window_secs: u64) -> Self {
        Self::query_failed(format!(
            "{}: at most {} queries per {}s",
            RATE_LIMIT_PREFIX, max_queries, window_secs
        ))
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == DnsErrorKind::QueryFailed && self.message.starts_with(RATE_LIMIT_PREFIX)
    }

    /// The server answered, but with no usable TXT data.
    pub fn no_records(detail: impl fmt::Display) -> Self {
        Self::query_failed(format!("{} {}", NO_RECORDS_PREFIX, detail))
    }

    /// Empty answers are the only failure worth re-asking the same transport about.
    pub fn is_no_records(&self) -> bool {
        self.kind == DnsErrorKind::QueryFailed && self.message.starts_with(NO_RECORDS_PREFIX)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == DnsErrorKind::Timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = DnsError::timeout("no answer from ch.at");
        assert_eq!(err.to_string(), "Timeout: no answer from ch.at");
    }

    #[test]
    fn test_rate_limited_is_query_failed() {
        let err = DnsError::rate_limited(60, 60);
        assert_eq!(err.kind, DnsErrorKind::QueryFailed);
        assert!(err.is_rate_limited());
        assert!(!DnsError::query_failed("rcode=2").is_rate_limited());
    }

    #[test]
    fn test_no_records_is_query_failed() {
        let err = DnsError::no_records("for hello.ch.at");
        assert_eq!(err.kind, DnsErrorKind::QueryFailed);
        assert_eq!(err.message, "No TXT records found for hello.ch.at");
        assert!(err.is_no_records());
        assert!(!err.is_rate_limited());
        assert!(!DnsError::timeout("No TXT records found").is_no_records());
        assert!(!DnsError::query_failed("rcode=3").is_no_records());
    }
}
