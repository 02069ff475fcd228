//! In-process transport doubles shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::FetchError;
use crate::http::{ApiRequest, RawResponse, Transport};

type Outcome = Result<RawResponse, FetchError>;

/// Replays scripted outcomes per URL path, then repeats the fallback.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<ScriptState>,
}

#[derive(Default)]
struct ScriptState {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    fallbacks: Mutex<HashMap<String, Outcome>>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
    calls_by_path: Mutex<HashMap<String, usize>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one outcome for `path`.
    pub fn push(&self, path: &str, outcome: Outcome) -> &Self {
        self.inner
            .scripts
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Outcome repeated for `path` once its queue is empty.
    pub fn always(&self, path: &str, outcome: Outcome) -> &Self {
        self.inner
            .fallbacks
            .lock()
            .unwrap()
            .insert(path.to_string(), outcome);
        self
    }

    pub fn json(&self, path: &str, status: u16, body: &str) -> &Self {
        self.always(path, Ok(RawResponse::new(status, body)))
    }

    /// Simulated latency for every attempt.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.inner.delay.lock().unwrap() = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.inner
            .calls_by_path
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    fn next_outcome(&self, path: &str) -> Outcome {
        if let Some(outcome) = self
            .inner
            .scripts
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
        {
            return outcome;
        }
        self.inner
            .fallbacks
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Ok(RawResponse::new(404, "not scripted")))
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, FetchError> {
        let path = request.url.path().to_string();
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .inner
            .calls_by_path
            .lock()
            .unwrap()
            .entry(path.clone())
            .or_default() += 1;

        let delay = *self.inner.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.next_outcome(&path)
    }
}

pub fn transport_error(url: &str) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message: "connection reset by peer".to_string(),
    }
}
