//! Versioned handler registry.
//!
//! # Responsibilities
//! - Collect (method, version, tier, handler) registrations at startup
//! - Reject duplicate registrations within one method and tier
//! - Freeze into an immutable, shareable [`Registry`]
//!
//! # Design Decisions
//! - Keys are structural (`1.4 == 1.4.0`), lookups are semantic (resolver.rs)
//! - No interior mutability: hot reload builds a new registry and swaps it

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::dispatch::error::RegistryError;
use crate::version::Version;

/// Which lookup tier a handler belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Only an equal request version selects the handler.
    Exact,
    /// Any request version at or above the handler's version may select it.
    Range,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Exact => f.write_str("exact"),
            Tier::Range => f.write_str("range"),
        }
    }
}

/// Handlers for one method, split by tier.
#[derive(Debug, Clone)]
pub struct MethodTable<H> {
    exact: HashMap<Version, H>,
    range: HashMap<Version, H>,
}

impl<H> Default for MethodTable<H> {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            range: HashMap::new(),
        }
    }
}

impl<H> MethodTable<H> {
    pub fn tier(&self, tier: Tier) -> &HashMap<Version, H> {
        match tier {
            Tier::Exact => &self.exact,
            Tier::Range => &self.range,
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut HashMap<Version, H> {
        match tier {
            Tier::Exact => &mut self.exact,
            Tier::Range => &mut self.range,
        }
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Startup-time collector for handler registrations.
#[derive(Debug)]
pub struct RegistryBuilder<H> {
    tables: HashMap<Method, MethodTable<H>>,
}

impl<H> Default for RegistryBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RegistryBuilder<H> {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Register a handler. The same structural version may appear once per
    /// method and tier.
    pub fn register(
        &mut self,
        method: Method,
        version: impl Into<Version>,
        tier: Tier,
        handler: H,
    ) -> Result<&mut Self, RegistryError> {
        let version = version.into();
        let table = self.tables.entry(method.clone()).or_default();

        match table.tier_mut(tier).entry(version) {
            Entry::Occupied(slot) => {
                return Err(RegistryError::Duplicate {
                    method,
                    tier,
                    version: slot.key().clone(),
                });
            }
            Entry::Vacant(slot) => {
                tracing::trace!(method = %method, tier = %tier, version = %slot.key(), "Handler registered");
                slot.insert(handler);
            }
        }
        Ok(self)
    }

    /// Freeze the registrations.
    pub fn build(self) -> Registry<H> {
        Registry {
            tables: self.tables,
        }
    }
}

/// Immutable handler registry, keyed by method then tier then version.
#[derive(Debug, Clone)]
pub struct Registry<H> {
    tables: HashMap<Method, MethodTable<H>>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        RegistryBuilder::new().build()
    }
}

impl<H> Registry<H> {
    pub fn builder() -> RegistryBuilder<H> {
        RegistryBuilder::new()
    }

    pub fn table(&self, method: &Method) -> Option<&MethodTable<H>> {
        self.tables.get(method)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> + '_ {
        self.tables.keys()
    }

    /// Total number of registered handlers.
    pub fn len(&self) -> usize {
        self.tables.values().map(MethodTable::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
