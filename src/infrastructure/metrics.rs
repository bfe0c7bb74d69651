//! Prometheus recorder and the names of every metric the service emits.
//!
//! Call sites use the `metrics` facade macros with the constants below. Until
//! [`install_recorder`] runs, those calls are no-ops.

use metrics::{Unit, describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUEST_TOTAL: &str = "http_request_total";
pub const REDIRECT_LATENCY_SECONDS: &str = "redirect_latency_seconds";
pub const REDIRECT_REQUESTS_TOTAL: &str = "redirect_requests_total";
pub const URL_CACHE_REQUESTS_TOTAL: &str = "url_cache_requests_total";
pub const EXISTENCE_FILTER_REJECTIONS_TOTAL: &str = "existence_filter_rejections_total";
pub const RATE_LIMIT_BLOCKED_TOTAL: &str = "rate_limit_blocked_total";
pub const CLICK_EVENTS_DROPPED_TOTAL: &str = "click_events_dropped_total";
pub const CLICKS_RECORDED_TOTAL: &str = "clicks_recorded_total";

/// Exponential buckets from 1 ms, doubling ten times.
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.002, 0.004, 0.008, 0.016, 0.032, 0.064, 0.128, 0.256, 0.512,
];

/// Installs the global Prometheus recorder and registers metric descriptions.
///
/// The returned handle renders the exposition text served on `GET /metrics`.
/// The caller must run [`PrometheusHandle::run_upkeep`] periodically.
///
/// # Errors
///
/// Fails if a global recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REDIRECT_LATENCY_SECONDS.to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    describe();

    Ok(handle)
}

fn describe() {
    describe_counter!(
        HTTP_REQUEST_TOTAL,
        "Total number of HTTP requests by method, matched route and status"
    );
    describe_histogram!(
        REDIRECT_LATENCY_SECONDS,
        Unit::Seconds,
        "Latency of successful short code resolutions"
    );
    describe_counter!(
        REDIRECT_REQUESTS_TOTAL,
        "Redirect requests by outcome"
    );
    describe_counter!(
        URL_CACHE_REQUESTS_TOTAL,
        "URL cache lookups by result (hit, miss, error)"
    );
    describe_counter!(
        EXISTENCE_FILTER_REJECTIONS_TOTAL,
        "Lookups answered as not found by the existence filter"
    );
    describe_counter!(
        RATE_LIMIT_BLOCKED_TOTAL,
        "Requests rejected by the rate limiter"
    );
    describe_counter!(
        CLICK_EVENTS_DROPPED_TOTAL,
        "Click events dropped because the queue was full or closed"
    );
    describe_counter!(
        CLICKS_RECORDED_TOTAL,
        "Click events persisted by the background worker"
    );
}
