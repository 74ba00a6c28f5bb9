//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → [command-line overrides applied by the binary]
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → moved into HttpServer, shared via Arc with handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{
    ApiConfig, ContentConfig, LifecycleConfig, ListenerConfig, ObservabilityConfig,
    ProxyPolicyConfig, ServerConfig, TimeoutConfig, WebConfig,
};
pub use validation::ValidationError;
