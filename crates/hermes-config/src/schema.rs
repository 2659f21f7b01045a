//! Configuration section types.

use hermes_core::ErrorPolicy;
use serde::{Deserialize, Serialize};

/// How the engine treats failures and which resource serves `/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Policy for explicit status conditions (400, 404, 405, 406, 415 and
    /// statuses raised by handlers).
    #[serde(default)]
    pub conditions: ErrorPolicy,

    /// Policy for handler errors and panics.
    #[serde(default)]
    pub internal_errors: ErrorPolicy,

    /// Resource dispatched for a bare `/` request.
    #[serde(default)]
    pub home_resource: Option<String>,
}

/// Metrics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the Prometheus recorder.
    #[serde(default)]
    pub enabled: bool,

    /// Scrape listener address. In-process only when unset.
    #[serde(default)]
    pub addr: Option<String>,

    /// Latency histogram buckets in seconds. Built-in buckets when unset.
    #[serde(default)]
    pub duration_buckets: Option<Vec<f64>>,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines (production).
    #[default]
    Json,
    /// Human-readable multi-line output (development).
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` expression).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// ANSI colors in pretty output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Source file and line in every event.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name attached to the startup event.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Deployment environment.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            metrics: MetricsSection::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_service_name() -> String {
    "hermes".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}
