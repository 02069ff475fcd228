//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (base URL, revalidation secret)
//!     → validation.rs (semantic checks)
//!     → StorefrontConfig (validated, immutable)
//!     → StorefrontClient::from_config
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ApiConfig, CacheConfig, FetchConfig, ObservabilityConfig, StorageBackend, StorefrontConfig,
};
pub use validation::ValidationError;
