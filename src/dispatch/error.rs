//! Dispatch and registration errors.

use axum::http::Method;
use thiserror::Error;

use crate::dispatch::registry::Tier;
use crate::version::Version;

/// Resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No handler in either tier applies to the request version.
    #[error("no {method} handler for {version}")]
    NotFound { method: Method, version: Version },
}

/// Registration failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The same version was registered twice in one method and tier.
    #[error("duplicate {tier} {method} handler for {version}")]
    Duplicate {
        method: Method,
        tier: Tier,
        version: Version,
    },
}
