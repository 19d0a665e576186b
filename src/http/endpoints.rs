//! Compiled endpoint tables.
//!
//! # Responsibilities
//! - Turn validated endpoint config into one handler registry per path
//! - Look up the registry for a request path
//!
//! # Design Decisions
//! - Built once per config revision and swapped atomically on reload
//! - Path lookup is exact after normalization (no prefix matching)

use std::collections::HashMap;

use axum::http::StatusCode;

use crate::config::validation::{compile_endpoints, normalize_path, uneven_versions};
use crate::config::{ConfigError, HandlerConfig, ServiceConfig};
use crate::dispatch::Registry;
use crate::http::extract::VersionHeaders;

/// Canned response a configured handler produces.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub name: String,
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl HandlerResponse {
    fn from_config(handler: &HandlerConfig) -> Self {
        let name = handler.name.clone().unwrap_or_else(|| {
            let method = handler.http_method().map(|m| m.to_string()).unwrap_or_default();
            match handler.app_version() {
                Ok(version) => format!("{} {}", method, version),
                Err(_) => method,
            }
        });

        Self {
            name,
            status: StatusCode::from_u16(handler.status).unwrap_or(StatusCode::OK),
            body: handler.body.clone(),
        }
    }
}

/// Everything needed to dispatch requests for one config revision.
#[derive(Debug)]
pub struct Dispatcher {
    endpoints: HashMap<String, Registry<HandlerResponse>>,
    headers: VersionHeaders,
    envelope: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            endpoints: HashMap::new(),
            headers: VersionHeaders::default(),
            envelope: true,
        }
    }
}

impl Dispatcher {
    /// Compile a configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let headers = VersionHeaders::from_config(&config.versioning)
            .map_err(|e| ConfigError::Validation(vec![e]))?;

        let endpoints = compile_endpoints(&config.endpoints, HandlerResponse::from_config)?
            .into_iter()
            .collect();

        for uneven in uneven_versions(&config.endpoints) {
            tracing::warn!(
                path = %uneven.path,
                handler = uneven.index,
                version = %uneven.version,
                "Handler version differs across platforms; shared-header requests between its values skip it"
            );
        }

        Ok(Self {
            endpoints,
            headers,
            envelope: config.versioning.envelope,
        })
    }

    /// Registry for a request path.
    pub fn endpoint(&self, path: &str) -> Option<&Registry<HandlerResponse>> {
        self.endpoints.get(&normalize_path(path))
    }

    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &Registry<HandlerResponse>)> + '_ {
        self.endpoints.iter().map(|(path, registry)| (path.as_str(), registry))
    }

    pub fn headers(&self) -> &VersionHeaders {
        &self.headers
    }

    pub fn envelope(&self) -> bool {
        self.envelope
    }

    /// Total number of handlers across all endpoints.
    pub fn handler_count(&self) -> usize {
        self.endpoints.values().map(Registry::len).sum()
    }
}
