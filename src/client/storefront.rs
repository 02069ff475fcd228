//! The caller-facing fetch client.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cache::{FileStorage, MemoryStorage, Storage, StorageError, TtlCache};
use crate::config::{StorageBackend, StorefrontConfig};
use crate::dedup::PendingRequestRegistry;
use crate::error::FetchError;
use crate::http::{resolve_url, ApiRequest, HttpTransport, RequestOptions, Transport};
use crate::observability::metrics;
use crate::resilience::{FetchPolicy, RetryExecutor};

/// Default TTL when neither the call nor the policy names one.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Options for [`StorefrontClient::cached_fetch`].
#[derive(Debug, Clone, Default)]
pub struct CachedFetchOptions {
    /// Validity window; falls back to the policy's `cache_ttl`, then the client default.
    pub ttl: Option<Duration>,
    /// Cache key override; defaults to the URL as given.
    pub key: Option<String>,
    /// On a hit, also refresh the entry in the background.
    pub revalidate: bool,
    /// Method, headers and body of the underlying request.
    pub request: RequestOptions,
    /// Policy override; defaults to the client's policy.
    pub policy: Option<FetchPolicy>,
}

impl CachedFetchOptions {
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn revalidate(mut self) -> Self {
        self.revalidate = true;
        self
    }

    pub fn request(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }

    pub fn policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// Failure to assemble a client from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl { url: String, source: url::ParseError },

    #[error("failed to open cache storage: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] FetchError),
}

/// Builder for [`StorefrontClient`].
pub struct ClientBuilder<T> {
    transport: T,
    base_url: Option<Url>,
    policy: FetchPolicy,
    default_ttl: Duration,
    cache: Option<TtlCache>,
}

impl<T: Transport> ClientBuilder<T> {
    /// Root that relative paths are joined onto. A missing trailing `/` is added.
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(with_trailing_slash(base_url));
        self
    }

    pub fn policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn cache(mut self, cache: TtlCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> StorefrontClient<T> {
        StorefrontClient {
            executor: Arc::new(RetryExecutor::new(self.transport)),
            registry: PendingRequestRegistry::new(),
            cache: self.cache.unwrap_or_else(TtlCache::in_memory),
            base_url: self.base_url,
            policy: self.policy,
            default_ttl: self.default_ttl,
        }
    }
}

/// Fetch client over the admin API: cache → dedup → retry → timeout → transport.
///
/// Each instance owns its own cache handle and pending-request registry;
/// clones share both.
pub struct StorefrontClient<T = HttpTransport> {
    pub(crate) executor: Arc<RetryExecutor<T>>,
    registry: PendingRequestRegistry,
    cache: TtlCache,
    base_url: Option<Url>,
    policy: FetchPolicy,
    default_ttl: Duration,
}

impl<T> Clone for StorefrontClient<T> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            registry: self.registry.clone(),
            cache: self.cache.clone(),
            base_url: self.base_url.clone(),
            policy: self.policy.clone(),
            default_ttl: self.default_ttl,
        }
    }
}

impl StorefrontClient<HttpTransport> {
    /// Assemble a reqwest-backed client from validated configuration.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, BuildError> {
        let transport = HttpTransport::new(&config.api.user_agent)?;

        let storage: Arc<dyn Storage> = match (config.cache.backend, &config.cache.path) {
            (StorageBackend::File, Some(path)) => {
                Arc::new(FileStorage::open(path, config.cache.quota_bytes)?)
            }
            _ => match config.cache.quota_bytes {
                Some(quota) => Arc::new(MemoryStorage::with_quota(quota)),
                None => Arc::new(MemoryStorage::new()),
            },
        };

        let mut builder = StorefrontClient::builder(transport)
            .policy(config.fetch.policy())
            .default_ttl(config.cache.default_ttl())
            .cache(TtlCache::new(storage, config.cache.namespace.clone()));

        if let Some(base_url) = &config.api.base_url {
            let parsed = Url::parse(base_url).map_err(|source| BuildError::InvalidBaseUrl {
                url: base_url.clone(),
                source,
            })?;
            builder = builder.base_url(parsed);
        }

        Ok(builder.build())
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl<T: Transport> StorefrontClient<T> {
    pub fn builder(transport: T) -> ClientBuilder<T> {
        ClientBuilder {
            transport,
            base_url: None,
            policy: FetchPolicy::default(),
            default_ttl: DEFAULT_CACHE_TTL,
            cache: None,
        }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    pub fn registry(&self) -> &PendingRequestRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        self.executor.transport()
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    fn prepare(&self, url: &str, options: &RequestOptions) -> Result<ApiRequest, FetchError> {
        let resolved = resolve_url(self.base_url.as_ref(), url)?;
        Ok(ApiRequest::new(resolved, options.clone()))
    }

    /// GET `url` with retries, decoding the body as `R`.
    pub async fn fetch_with_retry<R: DeserializeOwned>(
        &self,
        url: &str,
        policy: &FetchPolicy,
    ) -> Result<R, FetchError> {
        self.fetch_with_options(url, &RequestOptions::get(), policy).await
    }

    /// Send an arbitrary request with retries, decoding the body as `R`.
    pub async fn fetch_with_options<R: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
        policy: &FetchPolicy,
    ) -> Result<R, FetchError> {
        let request = self.prepare(url, options)?;
        let value = self.executor.execute(&request, policy).await?;
        decode(request.url.as_str(), &value)
    }

    /// Like [`fetch_with_options`](Self::fetch_with_options), but concurrent
    /// identical requests share a single underlying call.
    pub async fn fetch_deduplicated<R: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
        policy: &FetchPolicy,
    ) -> Result<R, FetchError> {
        let value = self.fetch_shared(url, options, policy).await?;
        decode(url, &value)
    }

    async fn fetch_shared(
        &self,
        url: &str,
        options: &RequestOptions,
        policy: &FetchPolicy,
    ) -> Result<Arc<Value>, FetchError> {
        let request = self.prepare(url, options)?;
        let key = request.options.dedup_key(&request.url);
        let executor = self.executor.clone();
        let policy = policy.clone();

        self.registry
            .run(key, move || async move { executor.execute(&request, &policy).await })
            .await
    }

    /// Cached payload for `key`, if present and unexpired.
    pub fn get_cached_data<R: DeserializeOwned>(&self, key: &str) -> Option<R> {
        self.cache.get(key)
    }

    /// Store `data` under `key`; `None` uses the client's default TTL.
    pub fn set_cached_data<R: Serialize + ?Sized>(&self, key: &str, data: &R, ttl: Option<Duration>) {
        self.cache.set(key, data, ttl.unwrap_or(self.default_ttl));
    }

    /// Read-through fetch: serve from cache, else fetch (deduplicated) and store.
    ///
    /// Only successful responses are cached, so a failed first read always
    /// surfaces its error.
    pub async fn cached_fetch<R: DeserializeOwned>(
        &self,
        url: &str,
        options: CachedFetchOptions,
    ) -> Result<R, FetchError> {
        let policy = options.policy.unwrap_or_else(|| self.policy.clone());
        let ttl = options.ttl.or(policy.cache_ttl).unwrap_or(self.default_ttl);
        let key = options.key.unwrap_or_else(|| url.to_string());

        if let Some(cached) = self.cache.get_value(&key) {
            if let Ok(data) = decode::<R>(url, &cached) {
                if options.revalidate {
                    self.spawn_revalidation(url, key, options.request, policy, ttl);
                }
                return Ok(data);
            }
        }

        let value = self.fetch_shared(url, &options.request, &policy).await?;
        let data = decode(url, &value)?;
        self.cache.set_value(&key, Value::clone(&value), ttl);
        Ok(data)
    }

    fn spawn_revalidation(
        &self,
        url: &str,
        key: String,
        request: RequestOptions,
        policy: FetchPolicy,
        ttl: Duration,
    ) {
        let client = self.clone();
        let url = url.to_string();

        // Detached and never awaited: the caller already has a valid value.
        // A failed refresh is dropped and the current entry simply ages out.
        tokio::spawn(async move {
            match client.fetch_shared(&url, &request, &policy).await {
                Ok(value) => {
                    client.cache.set_value(&key, Value::clone(&value), ttl);
                    metrics::record_revalidation("refreshed");
                }
                Err(e) => {
                    tracing::debug!(url = %url, key = %key, error = %e, "Background revalidation failed");
                    metrics::record_revalidation("failed");
                }
            }
        });
    }

    /// Remove one cached entry. Idempotent.
    pub fn clear_cache(&self, key: &str) {
        self.cache.invalidate(key);
    }

    /// Remove every cached entry in this client's namespace.
    pub fn clear_all_cache(&self) {
        self.cache.clear();
    }
}

/// Decode a shared payload into the caller's type.
fn decode<R: DeserializeOwned>(url: &str, value: &Value) -> Result<R, FetchError> {
    R::deserialize(value).map_err(|e| FetchError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}
