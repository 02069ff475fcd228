//! Retry executor.
//!
//! # Responsibilities
//! - Attempt the transport up to `1 + max_retries` times
//! - Classify each failure as retryable or terminal
//! - Sleep `base × 2^retry_index` between attempts
//!
//! # Design Decisions
//! - 4xx and unparseable bodies fail fast; retrying cannot change them
//! - 5xx, timeouts and connection failures are retried
//! - On exhaustion the last real error is returned, never a synthetic one
//! - No overall deadline: callers needing one wrap the executor themselves

use serde_json::Value;
use std::time::Instant;

use crate::error::FetchError;
use crate::http::{ApiRequest, Transport};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::policy::FetchPolicy;
use crate::resilience::timeouts::send_with_timeout;

/// Applies a `FetchPolicy` around a transport.
#[derive(Debug)]
pub struct RetryExecutor<T> {
    transport: T,
}

impl<T: Transport> RetryExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `request` under `policy`, returning the decoded JSON body.
    pub async fn execute(&self, request: &ApiRequest, policy: &FetchPolicy) -> Result<Value, FetchError> {
        let start = Instant::now();
        let url = request.url.as_str();
        let mut retry_index = 0u32;

        loop {
            let outcome = send_with_timeout(&self.transport, request, policy.timeout)
                .await
                .and_then(|response| response.into_json(url));

            let err = match outcome {
                Ok(value) => {
                    metrics::record_attempt("success");
                    metrics::record_fetch("success", start);
                    tracing::debug!(
                        request_id = %request.id,
                        url = %url,
                        attempts = retry_index + 1,
                        "Fetch succeeded"
                    );
                    return Ok(value);
                }
                Err(err) => err,
            };
            metrics::record_attempt(err.kind());

            if !err.is_retryable() || retry_index >= policy.max_retries {
                metrics::record_fetch(err.kind(), start);
                tracing::warn!(
                    request_id = %request.id,
                    url = %url,
                    attempts = retry_index + 1,
                    error = %err,
                    retryable = err.is_retryable(),
                    "Fetch failed"
                );
                return Err(err);
            }

            let delay = calculate_backoff(retry_index, policy.retry_delay_base);
            tracing::info!(
                request_id = %request.id,
                url = %url,
                attempt = retry_index + 1,
                delay = ?delay,
                error = %err,
                "Retrying request"
            );
            metrics::record_retry(err.kind());
            tokio::time::sleep(delay).await;
            retry_index += 1;
        }
    }
}
