//! Version-aware request dispatch.
//!
//! Handlers are registered per HTTP method under an app version (iOS,
//! Android and/or Web) in one of two tiers. A request resolves to the exact
//! tier's equal version if there is one, otherwise to the greatest range-tier
//! version not above the request's.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod version;

pub use config::ServiceConfig;
pub use dispatch::{resolve, Action, DispatchError, Registry, RegistryBuilder, Tier};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use version::{AppVersion, Platform, PlatformVersion, Version, VersionError};
