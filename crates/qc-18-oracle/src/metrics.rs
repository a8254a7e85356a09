//! # Oracle Metrics
//!
//! Prometheus metrics for the request lifecycle.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-oracle = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `oracle_requests_added_total` - Counter of admitted requests
//! - `oracle_reports_received_total` - Counter of accepted validator reports
//! - `oracle_requests_resolved_total` - Counter of resolutions (by status)
//! - `oracle_requests_expired_total` - Counter of expired requests

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total requests admitted
    pub static ref REQUESTS_ADDED: IntCounter = register_int_counter!(
        "oracle_requests_added_total",
        "Total number of oracle requests admitted"
    )
    .expect("Failed to create REQUESTS_ADDED metric");

    /// Total validator reports accepted
    pub static ref REPORTS_RECEIVED: IntCounter = register_int_counter!(
        "oracle_reports_received_total",
        "Total number of validator reports accepted"
    )
    .expect("Failed to create REPORTS_RECEIVED metric");

    /// Total requests resolved, labeled by outcome
    pub static ref REQUESTS_RESOLVED: IntCounterVec = register_int_counter_vec!(
        "oracle_requests_resolved_total",
        "Total number of oracle requests resolved",
        &["status"]
    )
    .expect("Failed to create REQUESTS_RESOLVED metric");

    /// Total requests expired before resolution
    pub static ref REQUESTS_EXPIRED: IntCounter = register_int_counter!(
        "oracle_requests_expired_total",
        "Total number of oracle requests expired"
    )
    .expect("Failed to create REQUESTS_EXPIRED metric");
}

/// Record an admitted request
#[cfg(feature = "metrics")]
pub fn record_request_added() {
    REQUESTS_ADDED.inc();
}

/// Record an accepted report
#[cfg(feature = "metrics")]
pub fn record_report_received() {
    REPORTS_RECEIVED.inc();
}

/// Record a resolution with its status label
#[cfg(feature = "metrics")]
pub fn record_request_resolved(status: &str) {
    REQUESTS_RESOLVED.with_label_values(&[status]).inc();
}

/// Record an expired request
#[cfg(feature = "metrics")]
pub fn record_request_expired() {
    REQUESTS_EXPIRED.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_request_added() {}

#[cfg(not(feature = "metrics"))]
pub fn record_report_received() {}

#[cfg(not(feature = "metrics"))]
pub fn record_request_resolved(_status: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_request_expired() {}
