//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse every handler version and method up front
//! - Detect duplicate handlers per endpoint, method and tier
//! - Validate value ranges (timeouts > 0, status codes, bind address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Version problems surface here, at startup, not at request time

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::{EndpointConfig, HandlerConfig, ServiceConfig};
use crate::dispatch::{Registry, RegistryError};
use crate::version::{Version, VersionError};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("header name {0:?} is not a valid HTTP header")]
    HeaderName(String),

    #[error("endpoint #{0} has an empty path")]
    EmptyPath(usize),

    #[error("endpoint {0} is declared more than once")]
    DuplicateEndpoint(String),

    #[error("{path} handler #{index}: {reason}")]
    Method {
        path: String,
        index: usize,
        reason: String,
    },

    #[error("{path} handler #{index}: {source}")]
    Version {
        path: String,
        index: usize,
        source: VersionError,
    },

    #[error("{path} handler #{index}: status {status} is not valid")]
    Status {
        path: String,
        index: usize,
        status: u16,
    },

    #[error("{path}: {source}")]
    Duplicate {
        path: String,
        source: RegistryError,
    },
}

/// Normalize an endpoint path: leading slash, no trailing slash.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Validate a whole configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let versioning = &config.versioning;
    for name in [
        &versioning.header,
        &versioning.ios_header,
        &versioning.android_header,
        &versioning.web_header,
    ] {
        if axum::http::HeaderName::from_bytes(name.trim().as_bytes()).is_err() {
            errors.push(ValidationError::HeaderName(name.clone()));
        }
    }

    errors.extend(validate_endpoints(&config.endpoints));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate endpoint declarations, including a dry-run registration of every
/// handler to catch duplicates.
pub fn validate_endpoints(endpoints: &[EndpointConfig]) -> Vec<ValidationError> {
    compile_endpoints(endpoints, |_| ()).err().unwrap_or_default()
}

/// Build one registry per endpoint path, with `make` producing the handler
/// stored for each declaration.
pub fn compile_endpoints<H>(
    endpoints: &[EndpointConfig],
    mut make: impl FnMut(&HandlerConfig) -> H,
) -> Result<Vec<(String, Registry<H>)>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut compiled = Vec::with_capacity(endpoints.len());

    for (position, endpoint) in endpoints.iter().enumerate() {
        if endpoint.path.trim().trim_end_matches('/').is_empty() && endpoint.path.trim() != "/" {
            errors.push(ValidationError::EmptyPath(position));
            continue;
        }

        let path = normalize_path(&endpoint.path);
        if !seen.insert(path.clone()) {
            errors.push(ValidationError::DuplicateEndpoint(path.clone()));
        }

        let mut registry = Registry::builder();
        for (index, handler) in endpoint.handlers.iter().enumerate() {
            let registered = check_handler(&path, index, handler).and_then(|(method, version)| {
                registry
                    .register(method, version, handler.tier(), make(handler))
                    .map(|_| ())
                    .map_err(|source| ValidationError::Duplicate {
                        path: path.clone(),
                        source,
                    })
            });
            if let Err(error) = registered {
                errors.push(error);
            }
        }
        compiled.push((path, registry.build()));
    }

    if errors.is_empty() {
        Ok(compiled)
    } else {
        Err(errors)
    }
}

/// A handler whose platforms carry different versions.
///
/// A request made with the shared version header has the same value on every
/// platform, so it only orders against such a handler when it is below or
/// above all of the handler's values. In between, the handler is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnevenVersion {
    pub path: String,
    pub index: usize,
    pub version: Version,
}

impl fmt::Display for UnevenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} handler #{}: {} differs across platforms; shared-header requests between its values skip it",
            self.path, self.index, self.version
        )
    }
}

/// Handlers whose declared platforms do not share one version.
pub fn uneven_versions(endpoints: &[EndpointConfig]) -> Vec<UnevenVersion> {
    let mut found = Vec::new();
    for endpoint in endpoints {
        for (index, handler) in endpoint.handlers.iter().enumerate() {
            let Ok(version) = handler.app_version() else {
                continue;
            };
            let uneven = version.as_app().is_some_and(|app| {
                let mut values = app.platforms().map(|(_, v)| v);
                let first = values.next();
                values.any(|v| Some(v) != first)
            });
            if uneven {
                found.push(UnevenVersion {
                    path: normalize_path(&endpoint.path),
                    index,
                    version,
                });
            }
        }
    }
    found
}

fn check_handler(
    path: &str,
    index: usize,
    handler: &HandlerConfig,
) -> Result<(axum::http::Method, Version), ValidationError> {
    if StatusCode::from_u16(handler.status).is_err() {
        return Err(ValidationError::Status {
            path: path.to_string(),
            index,
            status: handler.status,
        });
    }

    let method = handler.http_method().map_err(|reason| ValidationError::Method {
        path: path.to_string(),
        index,
        reason,
    })?;

    let version = handler.app_version().map_err(|source| ValidationError::Version {
        path: path.to_string(),
        index,
        source,
    })?;

    Ok((method, version))
}
