//! Metrics instrumentation for zonal-dns.
//!
//! All metrics are prefixed with `zonal_dns.`

use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// Record a handled DNS question.
pub fn record_query(record_type: &str, result: QueryResult, duration: std::time::Duration) {
    let result_str = match result {
        QueryResult::Answered => "answered",
        QueryResult::EmptyZone => "empty_zone",
        QueryResult::UnknownClientZone => "unknown_client_zone",
        QueryResult::UpstreamError => "upstream_error",
        QueryResult::Timeout => "timeout",
        QueryResult::Unsupported => "unsupported",
    };

    counter!("zonal_dns.query.count", "type" => record_type.to_string(), "result" => result_str)
        .increment(1);
    histogram!("zonal_dns.query.duration.seconds", "type" => record_type.to_string())
        .record(duration.as_secs_f64());
}

/// Outcome of a handled question, for metrics.
#[derive(Debug, Clone, Copy)]
pub enum QueryResult {
    /// Question answered with one or more filtered addresses.
    Answered,
    /// Resolution succeeded but no address resides in the client's zone.
    EmptyZone,
    /// The client's zone could not be determined.
    UnknownClientZone,
    /// Upstream resolution failed; question omitted from the reply.
    UpstreamError,
    /// Per-question deadline exceeded; question omitted from the reply.
    Timeout,
    /// Non-A question, skipped without an answer.
    Unsupported,
}

/// Record how many addresses a successful filtered lookup returned.
pub fn record_answers_returned(count: usize) {
    histogram!("zonal_dns.query.answers_returned").record(count as f64);
}

/// Record a classification outcome for the given strategy.
pub fn record_classification(strategy: &'static str, known: bool) {
    let outcome = if known { "known" } else { "unknown" };
    counter!("zonal_dns.classification.count", "strategy" => strategy, "outcome" => outcome)
        .increment(1);
}

/// Record how many usable zone rules were loaded at startup.
pub fn record_rules_loaded(count: usize) {
    gauge!("zonal_dns.rules.loaded").set(count as f64);
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
