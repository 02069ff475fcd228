//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound a single transport attempt by a hard deadline
//! - Cancel the in-flight attempt once the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the attempt future aborts the
//!   underlying connection, so nothing outlives the deadline
//! - Timeout errors are distinct from transport errors and from any
//!   server-reported status

use std::time::Duration;

use crate::error::FetchError;
use crate::http::{ApiRequest, RawResponse, Transport};

/// Perform one attempt, failing with `FetchError::Timeout` past `timeout`.
pub async fn send_with_timeout<T: Transport>(
    transport: &T,
    request: &ApiRequest,
    timeout: Duration,
) -> Result<RawResponse, FetchError> {
    match tokio::time::timeout(timeout, transport.send(request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(
                request_id = %request.id,
                url = %request.url,
                timeout = ?timeout,
                "Attempt timed out"
            );
            Err(FetchError::Timeout {
                url: request.url.to_string(),
                timeout,
            })
        }
    }
}
