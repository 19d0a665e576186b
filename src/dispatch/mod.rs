//! Version-aware dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     (method, version, tier, handler)
//!     → registry.rs (RegistryBuilder, duplicate check)
//!     → Freeze as immutable Registry
//!
//! Per request:
//!     (method, request Version)
//!     → resolver.rs (exact tier, then range tier)
//!     → Return: handler or DispatchError::NotFound
//! ```
//!
//! # Design Decisions
//! - Exact tier has absolute priority over the range tier
//! - Range tier picks the greatest registered version not above the request
//! - Incomparable registrations are skipped, not fatal
//! - Action names map to HTTP methods through a constant table (action.rs)

pub mod action;
pub mod error;
pub mod registry;
pub mod resolver;

pub use action::Action;
pub use error::{DispatchError, RegistryError};
pub use registry::{MethodTable, Registry, RegistryBuilder, Tier};
pub use resolver::{resolve, Resolved};
