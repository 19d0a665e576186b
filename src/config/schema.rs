//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::dispatch::{Action, Tier};
use crate::version::{Version, VersionResult};

/// Root configuration for the versioned API service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// How request versions are read and responses shaped.
    pub versioning: VersioningConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Versioned endpoints and their handlers.
    pub endpoints: Vec<EndpointConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Request version headers and response shaping.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Header whose value applies to every platform.
    pub header: String,

    /// Per-platform headers; these override `header` for their platform.
    pub ios_header: String,
    pub android_header: String,
    pub web_header: String,

    /// Wrap handler bodies as `{"data": ..., "handler_version": ...}`.
    pub envelope: bool,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            header: "x-app-version".to_string(),
            ios_header: "x-ios-version".to_string(),
            android_header: "x-android-version".to_string(),
            web_header: "x-web-version".to_string(),
            envelope: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A path served by versioned handlers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Request path, matched exactly (trailing slash ignored).
    pub path: String,

    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

/// A single versioned handler.
///
/// `version` applies to every platform unless a platform key overrides it.
/// Leaving all of them out registers an unversioned (floor) handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandlerConfig {
    /// Label for logs and the response envelope.
    #[serde(default)]
    pub name: Option<String>,

    /// HTTP method, e.g. "GET". Mutually exclusive with `action`.
    #[serde(default)]
    pub method: Option<String>,

    /// CRUD action: read, create, update, delete.
    #[serde(default)]
    pub action: Option<Action>,

    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub ios: Option<String>,
    #[serde(default)]
    pub android: Option<String>,
    #[serde(default)]
    pub web: Option<String>,

    /// Only serve requests whose version equals this one.
    #[serde(default)]
    pub exact: bool,

    /// Response status code.
    #[serde(default = "default_status")]
    pub status: u16,

    /// Response body.
    #[serde(default)]
    pub body: serde_json::Value,
}

fn default_status() -> u16 {
    200
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            name: None,
            method: None,
            action: None,
            version: None,
            ios: None,
            android: None,
            web: None,
            exact: false,
            status: default_status(),
            body: serde_json::Value::Null,
        }
    }
}

impl HandlerConfig {
    /// Resolve `method`/`action` to an HTTP method.
    pub fn http_method(&self) -> Result<Method, String> {
        match (&self.method, self.action) {
            (Some(_), Some(_)) => Err("set either method or action, not both".to_string()),
            (None, None) => Err("missing method or action".to_string()),
            (None, Some(action)) => Ok(action.method()),
            (Some(method), None) => Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
                .map_err(|_| format!("invalid method {:?}", method)),
        }
    }

    pub fn app_version(&self) -> VersionResult<Version> {
        Version::parse_parts(
            self.version.as_deref(),
            self.ios.as_deref(),
            self.android.as_deref(),
            self.web.as_deref(),
        )
    }

    pub fn tier(&self) -> Tier {
        if self.exact {
            Tier::Exact
        } else {
            Tier::Range
        }
    }
}
