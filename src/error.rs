//! Fetch error taxonomy.
//!
//! Every variant carries owned strings so a single outcome can be cloned
//! out to all callers joined on one deduplicated request.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the fetch layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Local deadline elapsed before a response arrived.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// Connection refused, reset, DNS failure or a body that could not be read.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Non-success status outside the server-error range.
    #[error("HTTP {status} for {url}")]
    HttpClient { url: String, status: u16, body: String },

    /// 5xx response.
    #[error("HTTP {status} (server error) for {url}")]
    HttpServer { url: String, status: u16 },

    /// Body was received but is not the JSON shape the caller asked for.
    #[error("failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },

    /// URL could not be parsed or resolved against the base URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The task driving a shared request ended without an outcome.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FetchError {
    /// Whether another attempt could change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout { .. } | FetchError::Transport { .. } | FetchError::HttpServer { .. }
        )
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpClient { status, .. } | FetchError::HttpServer { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Short label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "timeout",
            FetchError::Transport { .. } => "transport",
            FetchError::HttpClient { .. } => "http_client",
            FetchError::HttpServer { .. } => "http_server",
            FetchError::Parse { .. } => "parse",
            FetchError::InvalidRequest(_) => "invalid_request",
            FetchError::Internal(_) => "internal",
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        let timeout = FetchError::Timeout {
            url: "u".into(),
            timeout: Duration::from_millis(50),
        };
        let transport = FetchError::Transport {
            url: "u".into(),
            message: "connection reset".into(),
        };
        let server = FetchError::HttpServer { url: "u".into(), status: 503 };
        let client = FetchError::HttpClient {
            url: "u".into(),
            status: 404,
            body: String::new(),
        };
        let parse = FetchError::Parse {
            url: "u".into(),
            message: "expected value".into(),
        };

        assert!(timeout.is_retryable());
        assert!(transport.is_retryable());
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!parse.is_retryable());
        assert!(!FetchError::InvalidRequest("bad".into()).is_retryable());
    }

    #[test]
    fn test_status_and_kind() {
        let err = FetchError::HttpClient {
            url: "u".into(),
            status: 422,
            body: "{}".into(),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.kind(), "http_client");
        assert_eq!(FetchError::Internal("x".into()).status(), None);
    }
}
