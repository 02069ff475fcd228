//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::StorefrontConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `api.base_url`.
pub const ENV_BASE_URL: &str = "STOREFRONT_API_BASE_URL";
/// Overrides `api.revalidation_secret`.
pub const ENV_REVALIDATION_SECRET: &str = "STOREFRONT_REVALIDATION_SECRET";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<StorefrontConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<StorefrontConfig, ConfigError> {
    let mut config: StorefrontConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using the given lookup.
pub fn apply_env_overrides<F>(config: &mut StorefrontConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
        tracing::debug!(base_url = %base_url, "api.base_url overridden from environment");
        config.api.base_url = Some(base_url);
    }
    if let Some(secret) = lookup(ENV_REVALIDATION_SECRET).filter(|v| !v.is_empty()) {
        config.api.revalidation_secret = Some(secret);
    }
}
