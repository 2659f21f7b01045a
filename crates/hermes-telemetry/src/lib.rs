//! Observability for the Hermes dispatch engine.
//!
//! - **Logging**: `tracing` events rendered as JSON lines or pretty text
//! - **Metrics**: Prometheus counters and histograms via the `metrics` crate
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hermes_dispatch_total` | Counter | `resource`, `status` | Dispatched requests |
//! | `hermes_dispatch_duration_seconds` | Histogram | `resource` | Dispatch latency |
//! | `hermes_conditions_total` | Counter | `kind` | Conditions raised |
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig {
//!     service_name: "catalog".to_string(),
//!     ..TelemetryConfig::default()
//! };
//! init_telemetry(&config)?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, record_condition, record_dispatch, render_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Service name, attached to the startup log line.
    pub service_name: String,

    /// Deployment environment (development, staging, production).
    pub environment: String,

    /// Metrics configuration.
    pub metrics: MetricsConfig,

    /// Logging configuration.
    pub logging: LogConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "hermes".to_string(),
            environment: "development".to_string(),
            metrics: MetricsConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        metrics = config.metrics.enabled,
        "telemetry initialized"
    );
    Ok(())
}
