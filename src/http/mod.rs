//! HTTP plumbing towards the admin API.
//!
//! # Data Flow
//! ```text
//! caller URL + options
//!     → request.rs (resolve against base URL, add request ID, dedup key)
//!     → client.rs (one reqwest attempt)
//!     → response.rs (status classification, JSON decoding)
//! ```

pub mod client;
pub mod request;
pub mod response;

pub use client::{HttpTransport, Transport};
pub use request::{resolve_url, ApiRequest, RequestId, RequestOptions, X_REQUEST_ID};
pub use response::RawResponse;
