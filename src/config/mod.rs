//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (versions, methods, duplicates)
//!     → ServiceConfig (validated, immutable)
//!     → compiled into handler registries by the http layer
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the compiled registries
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All sections have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    EndpointConfig, HandlerConfig, ListenerConfig, ObservabilityConfig, ServiceConfig,
    TimeoutConfig, VersioningConfig,
};
pub use validation::{uneven_versions, validate_config, UnevenVersion, ValidationError};
