//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by method and outcome
//! - `dispatch_duration_seconds` (histogram): time spent resolving a request
//!
//! Outcomes: `exact`, `range`, `not_found`, `no_endpoint`, `bad_version`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::dispatch::Tier;

/// How a request left the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Resolved(Tier),
    NotFound,
    NoEndpoint,
    BadVersion,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Resolved(Tier::Exact) => "exact",
            Outcome::Resolved(Tier::Range) => "range",
            Outcome::NotFound => "not_found",
            Outcome::NoEndpoint => "no_endpoint",
            Outcome::BadVersion => "bad_version",
        }
    }
}

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatch.
pub fn record_dispatch(method: &str, outcome: Outcome, start: Instant) {
    let outcome = outcome.label();
    ::metrics::counter!(
        "dispatch_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!("dispatch_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Resolved(Tier::Exact).label(), "exact");
        assert_eq!(Outcome::Resolved(Tier::Range).label(), "range");
        assert_eq!(Outcome::BadVersion.label(), "bad_version");
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_dispatch("GET", Outcome::NotFound, Instant::now());
    }
}
