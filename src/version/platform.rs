//! Dotted-numeric platform versions.
//!
//! Components compare left to right; missing trailing components count as
//! zero, so `1.4`, `1.4.0` and `1.4.0.0` are the same version.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::version::error::VersionError;

/// A single platform's version, e.g. `1.4.2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformVersion {
    components: Vec<u64>,
}

impl PlatformVersion {
    /// Parse a dotted-numeric version string.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Malformed(input.to_string()));
        }

        let components = trimmed
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionError::Malformed(input.to_string()));
                }
                part.parse::<u64>()
                    .map_err(|_| VersionError::Malformed(input.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }

    /// Components as written.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Components with trailing zeros stripped.
    fn significant(&self) -> &[u64] {
        let len = self
            .components
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..len]
    }
}

impl Ord for PlatformVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.components.len().max(other.components.len());
        for i in 0..width {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for PlatformVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PlatformVersion {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for PlatformVersion {}

impl Hash for PlatformVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl FromStr for PlatformVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlatformVersion {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlatformVersion> for String {
    fn from(value: PlatformVersion) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}
