//! HTTP binding subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → endpoints.rs (path → handler registry)
//!     → extract.rs (headers → request Version)
//!     → dispatch::resolver (method + version → handler)
//!     → response.rs (status, JSON body, envelope)
//! ```

pub mod endpoints;
pub mod extract;
pub mod request;
pub mod response;
pub mod server;

pub use endpoints::{Dispatcher, HandlerResponse};
pub use extract::VersionHeaders;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
