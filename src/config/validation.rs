//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and cross-field rules.
//! Every problem is reported, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::{StorageBackend, StorefrontConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.base_url is not a valid URL: {0}")]
    InvalidBaseUrl(String),

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("cache.namespace must not be empty")]
    EmptyNamespace,

    #[error("cache.path is required when cache.backend = \"file\"")]
    MissingCachePath,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &StorefrontConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(base_url) = &config.api.base_url {
        match Url::parse(base_url) {
            Ok(url) if url.cannot_be_a_base() => {
                errors.push(ValidationError::InvalidBaseUrl(base_url.clone()));
            }
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidBaseUrl(format!("{base_url} ({e})"))),
        }
    }

    if config.fetch.timeout_ms == 0 {
        errors.push(ValidationError::MustBePositive("fetch.timeout_ms"));
    }
    if config.fetch.retry_delay_base_ms == 0 {
        errors.push(ValidationError::MustBePositive("fetch.retry_delay_base_ms"));
    }
    if config.cache.default_ttl_ms == 0 {
        errors.push(ValidationError::MustBePositive("cache.default_ttl_ms"));
    }
    if config.cache.quota_bytes == Some(0) {
        errors.push(ValidationError::MustBePositive("cache.quota_bytes"));
    }
    if config.cache.namespace.is_empty() {
        errors.push(ValidationError::EmptyNamespace);
    }
    if config.cache.backend == StorageBackend::File && config.cache.path.is_none() {
        errors.push(ValidationError::MissingCachePath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
