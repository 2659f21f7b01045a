//! Prometheus metrics.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hermes_dispatch_total` | Counter | `resource`, `status` | Dispatched requests |
//! | `hermes_dispatch_duration_seconds` | Histogram | `resource` | Dispatch latency |
//! | `hermes_conditions_total` | Counter | `kind` | Conditions raised |
//!
//! The `record_*` functions are cheap no-ops until a recorder is installed.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Dispatch counter name.
pub const DISPATCH_TOTAL: &str = "hermes_dispatch_total";
/// Dispatch latency histogram name.
pub const DISPATCH_DURATION: &str = "hermes_dispatch_duration_seconds";
/// Condition counter name.
pub const CONDITIONS_TOTAL: &str = "hermes_conditions_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address for the scrape listener (e.g. `0.0.0.0:9090`).
    ///
    /// Without one, metrics are only available through [`render_metrics`].
    pub addr: Option<String>,

    /// Histogram buckets for dispatch latency, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: None,
            // 100µs .. 1s; dispatch itself is fast, handlers dominate the tail
            duration_buckets: vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ],
        }
    }
}

/// Installs the global Prometheus recorder.
///
/// # Errors
///
/// Returns an error if the address does not parse or a recorder is already
/// installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(DISPATCH_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    match &config.addr {
        Some(addr) => {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
            builder
                .with_http_listener(addr)
                .install()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        }
        None => {
            let handle = builder
                .install_recorder()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            let _ = METRICS_HANDLE.set(handle);
        }
    }

    describe_metrics();
    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` unless [`init_metrics`] installed an in-process recorder.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Requests dispatched, by resource and status");
    describe_histogram!(DISPATCH_DURATION, "Time spent dispatching a request, in seconds");
    describe_counter!(CONDITIONS_TOTAL, "Conditions raised during dispatch, by kind");
}

/// Records a completed dispatch.
pub fn record_dispatch(resource: &str, status: u16, duration: Duration) {
    counter!(
        DISPATCH_TOTAL,
        "resource" => resource.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(DISPATCH_DURATION, "resource" => resource.to_string())
        .record(duration.as_secs_f64());
}

/// Records a raised condition.
pub fn record_condition(kind: &'static str) {
    counter!(CONDITIONS_TOTAL, "kind" => kind).increment(1);
}
