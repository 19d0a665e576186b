//! Version model.
//!
//! # Data Flow
//! ```text
//! "1.4.2"            → platform.rs (PlatformVersion, total order)
//! ios/android/web    → app.rs (AppVersion, partial order across axes)
//! missing version    → Version::Absent (floor value)
//! ```
//!
//! # Design Decisions
//! - Comparison returns `Result<Ordering, VersionError>`, never panics
//! - A specific version (one axis) compares on the first shared axis
//! - Unrelated numbering schemes never compare (iOS 2.0 vs Android 1.9)
//! - Map keys use structural equality; dispatch uses `Version::matches`

pub mod app;
pub mod error;
pub mod platform;

pub use app::{AppVersion, Platform, Version};
pub use error::{VersionError, VersionResult};
pub use platform::PlatformVersion;
