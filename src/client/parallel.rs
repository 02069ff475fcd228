//! Fan-out over several URLs.

use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;

use crate::client::storefront::StorefrontClient;
use crate::error::FetchError;
use crate::http::Transport;
use crate::resilience::FetchPolicy;

impl<T: Transport> StorefrontClient<T> {
    /// Fetch every URL concurrently, each with its own retry budget.
    ///
    /// Results come back in input order. The first failure wins: the other
    /// in-flight fetches are dropped and no partial result is returned.
    pub async fn fetch_parallel<R, S>(&self, urls: &[S], policy: &FetchPolicy) -> Result<Vec<R>, FetchError>
    where
        R: DeserializeOwned,
        S: AsRef<str>,
    {
        tracing::debug!(count = urls.len(), "Starting parallel fetch");
        try_join_all(urls.iter().map(|url| self.fetch_with_retry(url.as_ref(), policy))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RawResponse;
    use crate::testing::ScriptedTransport;
    use serde_json::{json, Value};
    use std::time::Duration;
    use url::Url;

    fn client(transport: &ScriptedTransport) -> StorefrontClient<ScriptedTransport> {
        StorefrontClient::builder(transport.clone())
            .base_url(Url::parse("http://api.test/").unwrap())
            .build()
    }

    fn policy() -> FetchPolicy {
        FetchPolicy::default()
            .with_timeout(Duration::from_millis(100))
            .with_retry_delay_base(Duration::from_millis(10))
            .with_max_retries(1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_in_input_order() {
        let transport = ScriptedTransport::new();
        transport
            .json("/a", 200, r#"{"n":1}"#)
            .json("/b", 200, r#"{"n":2}"#)
            .json("/c", 200, r#"{"n":3}"#);
        let client = client(&transport);

        let results: Vec<Value> = client.fetch_parallel(&["c", "a", "b"], &policy()).await.unwrap();
        assert_eq!(results, vec![json!({"n": 3}), json!({"n": 1}), json!({"n": 2})]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failure_rejects_whole_call() {
        let transport = ScriptedTransport::new();
        transport.json("/url1", 200, "1").json("/url3", 200, "3");
        // /url2 is unscripted and answers 404
        let client = client(&transport);

        let err = client
            .fetch_parallel::<Value, _>(&["url1", "url2", "url3"], &policy())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpClient { status: 404, .. }));
        assert_eq!(transport.calls_to("/url2"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_url_retries_independently() {
        let transport = ScriptedTransport::new();
        transport
            .push("/flaky", Ok(RawResponse::new(503, "")))
            .json("/flaky", 200, "true")
            .json("/steady", 200, "false");
        let client = client(&transport);

        let results: Vec<bool> = client
            .fetch_parallel(&["flaky".to_string(), "steady".to_string()], &policy())
            .await
            .unwrap();
        assert_eq!(results, vec![true, false]);
        assert_eq!(transport.calls_to("/flaky"), 2);
        assert_eq!(transport.calls_to("/steady"), 1);
    }

    #[tokio::test]
    async fn test_empty_input_is_empty_output() {
        let client = client(&ScriptedTransport::new());
        let urls: [&str; 0] = [];
        let results: Vec<Value> = client.fetch_parallel(&urls, &policy()).await.unwrap();
        assert!(results.is_empty());
    }
}
