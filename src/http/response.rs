//! Raw upstream response and JSON decoding.

use serde_json::Value;

use crate::error::FetchError;

/// Status and body of one completed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Body as lossy UTF-8, truncated for error messages.
    pub fn body_snippet(&self) -> String {
        const MAX: usize = 512;
        let text = String::from_utf8_lossy(&self.body);
        match text.char_indices().nth(MAX) {
            Some((idx, _)) => format!("{}…", &text[..idx]),
            None => text.into_owned(),
        }
    }

    /// Map the attempt to a decoded JSON payload or a classified error.
    ///
    /// An empty 2xx body (e.g. 204) decodes to `null`.
    pub fn into_json(self, url: &str) -> Result<Value, FetchError> {
        if self.is_server_error() {
            return Err(FetchError::HttpServer {
                url: url.to_string(),
                status: self.status,
            });
        }
        if !self.is_success() {
            return Err(FetchError::HttpClient {
                url: url.to_string(),
                status: self.status,
                body: self.body_snippet(),
            });
        }
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|e| FetchError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
