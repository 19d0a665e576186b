//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Compile registries → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → Stop accepting → Drain → Exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
