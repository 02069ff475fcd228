//! Registry of in-flight requests keyed by URL + canonical options.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::error::FetchError;
use crate::observability::metrics;

/// Outcome handed to every caller joined on one request.
pub type SharedOutcome = Result<Arc<Value>, FetchError>;

type PendingRequest = Shared<BoxFuture<'static, SharedOutcome>>;

/// Collapses concurrent identical requests into one underlying call.
///
/// Cloning shares the same registry. At most one pending request exists per
/// key; it is removed as soon as it settles, whatever the outcome.
#[derive(Clone, Default)]
pub struct PendingRequestRegistry {
    pending: Arc<DashMap<String, PendingRequest>>,
}

/// Removes the registry entry when the request task ends, including on panic.
struct Deregister {
    pending: Arc<DashMap<String, PendingRequest>>,
    key: String,
}

impl Drop for Deregister {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}

impl PendingRequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests currently in flight.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    /// Join the pending request for `key`, or start one with `operation`.
    ///
    /// `operation` is only invoked when no request for `key` is in flight.
    /// The request runs on its own task, so it settles (and deregisters)
    /// even if every caller stops waiting for it.
    pub async fn run<F, Fut>(&self, key: String, operation: F) -> SharedOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>> + Send + 'static,
    {
        let request = match self.pending.entry(key) {
            Entry::Occupied(entry) => {
                metrics::record_dedup_join();
                tracing::debug!(key = %entry.key(), "Joining in-flight request");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let guard = Deregister {
                    pending: self.pending.clone(),
                    key: entry.key().clone(),
                };
                let operation = operation();
                let task = tokio::spawn(async move {
                    let _guard = guard;
                    operation.await.map(Arc::new)
                });
                let request = async move {
                    task.await.unwrap_or_else(|e| {
                        Err(FetchError::Internal(format!("request task failed: {e}")))
                    })
                }
                .boxed()
                .shared();
                entry.insert(request.clone());
                request
            }
        };

        request.await
    }
}
