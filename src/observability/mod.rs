//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch + http
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (dispatch counters and latency)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics are cheap; without an installed exporter they are no-ops

pub mod logging;
pub mod metrics;
