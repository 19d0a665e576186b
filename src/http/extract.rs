//! Request version extraction.
//!
//! The version comes from headers: one header that applies to every
//! platform, and one per platform that overrides it. A request without any
//! of them carries [`Version::Absent`].

use axum::http::{HeaderMap, HeaderName};

use crate::config::VersioningConfig;
use crate::config::ValidationError;
use crate::version::{Version, VersionError, VersionResult};

/// Parsed header names used to read a request's version.
#[derive(Debug, Clone)]
pub struct VersionHeaders {
    all: HeaderName,
    ios: HeaderName,
    android: HeaderName,
    web: HeaderName,
}

impl Default for VersionHeaders {
    fn default() -> Self {
        Self {
            all: HeaderName::from_static("x-app-version"),
            ios: HeaderName::from_static("x-ios-version"),
            android: HeaderName::from_static("x-android-version"),
            web: HeaderName::from_static("x-web-version"),
        }
    }
}

impl VersionHeaders {
    pub fn from_config(config: &VersioningConfig) -> Result<Self, ValidationError> {
        let name = |raw: &str| {
            HeaderName::from_bytes(raw.trim().as_bytes())
                .map_err(|_| ValidationError::HeaderName(raw.to_string()))
        };

        Ok(Self {
            all: name(&config.header)?,
            ios: name(&config.ios_header)?,
            android: name(&config.android_header)?,
            web: name(&config.web_header)?,
        })
    }

    /// Read the request version from `headers`.
    pub fn extract(&self, headers: &HeaderMap) -> VersionResult<Version> {
        Version::parse_parts(
            header_value(headers, &self.all)?,
            header_value(headers, &self.ios)?,
            header_value(headers, &self.android)?,
            header_value(headers, &self.web)?,
        )
    }
}

/// Trimmed header value; blank counts as missing.
fn header_value<'a>(headers: &'a HeaderMap, name: &HeaderName) -> VersionResult<Option<&'a str>> {
    let Some(raw) = headers.get(name) else {
        return Ok(None);
    };
    let value = raw
        .to_str()
        .map_err(|_| VersionError::Malformed(String::from_utf8_lossy(raw.as_bytes()).into_owned()))?
        .trim();
    Ok(Some(value).filter(|v| !v.is_empty()))
}
