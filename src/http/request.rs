//! Outbound request model.
//!
//! # Responsibilities
//! - Describe a request to the admin API (method, headers, JSON body)
//! - Resolve relative paths against the configured base URL
//! - Derive the canonical deduplication key
//! - Attach a unique request ID for tracing
//!
//! # Design Decisions
//! - Headers are kept in a `BTreeMap` so serialization order is stable
//! - The request ID is generated once per logical fetch and reused by every attempt

use reqwest::Method;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use url::Url;
use uuid::Uuid;

use crate::error::FetchError;

/// Header carrying the request ID upstream.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Unique identifier for one logical fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Method, headers and body of a request. Defaults to a bare GET.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    /// Add a header. Names are lower-cased so `Accept` and `accept` share a key.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Canonical serialization of the options.
    ///
    /// `serde_json` objects keep keys sorted, so two logically equal bodies
    /// serialize identically regardless of construction order.
    pub fn canonical(&self) -> String {
        json!({
            "method": self.method.as_str(),
            "headers": self.headers,
            "body": self.body,
        })
        .to_string()
    }

    /// Key under which concurrent identical requests are collapsed.
    pub fn dedup_key(&self, url: &Url) -> String {
        format!("{}{}", url, self.canonical())
    }
}

/// A fully resolved request ready for the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub id: RequestId,
    pub url: Url,
    pub options: RequestOptions,
}

impl ApiRequest {
    pub fn new(url: Url, options: RequestOptions) -> Self {
        Self {
            id: RequestId::new(),
            url,
            options,
        }
    }
}

/// Resolve `target` to an absolute URL.
///
/// Absolute URLs are used as-is; anything else is joined onto `base`.
pub fn resolve_url(base: Option<&Url>, target: &str) -> Result<Url, FetchError> {
    match Url::parse(target) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                FetchError::InvalidRequest(format!("relative URL {target:?} but no base URL configured"))
            })?;
            base.join(target.trim_start_matches('/'))
                .map_err(|e| FetchError::InvalidRequest(format!("{target:?}: {e}")))
        }
        Err(e) => Err(FetchError::InvalidRequest(format!("{target:?}: {e}"))),
    }
}
