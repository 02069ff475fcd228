//! Upstream transport.
//!
//! # Responsibilities
//! - Perform exactly one network attempt for an `ApiRequest`
//! - Propagate the request ID upstream
//! - Read the full body so the attempt's deadline covers it
//!
//! Deadlines and retries are layered on top in `resilience`; the transport
//! itself never retries.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;
use crate::http::request::{ApiRequest, X_REQUEST_ID};
use crate::http::response::RawResponse;

/// One network attempt against the upstream API.
///
/// Dropping the returned future must cancel the attempt; `resilience::timeouts`
/// relies on this to abort calls past their deadline.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: &ApiRequest) -> impl Future<Output = Result<RawResponse, FetchError>> + Send;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given User-Agent.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| FetchError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, FetchError> {
        let url = request.url.as_str();

        let mut builder = self
            .client
            .request(request.options.method.clone(), request.url.clone())
            .header(X_REQUEST_ID, request.id.to_string());
        for (name, value) in &request.options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.options.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let status = response.status().as_u16();

        // a reset mid-body is a transport failure, not a parse failure
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        tracing::trace!(
            request_id = %request.id,
            url = %url,
            status,
            bytes = body.len(),
            "Upstream responded"
        );

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
