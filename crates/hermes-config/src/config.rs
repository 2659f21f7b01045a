//! The root [`HermesConfig`] type, its presets and conversions.

use hermes_core::ErrorPolicy;
use hermes_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, DispatchConfig, LogFormat, TelemetryConfigSection};

/// Complete Hermes configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over the defaults.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
/// use hermes_core::ErrorPolicy;
///
/// let config = HermesConfig::default();
/// assert_eq!(config.dispatch.conditions, ErrorPolicy::Catch);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Failure policies and the home resource.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl HermesConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> HermesConfigBuilder {
        HermesConfigBuilder::new()
    }

    /// Checks cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the home resource is empty or contains `/`
    /// - the log level is not a valid filter directive
    /// - the metrics address does not parse
    /// - histogram buckets are empty, non-finite or not strictly increasing
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(home) = &self.dispatch.home_resource {
            if home.is_empty() || home.contains('/') {
                return Err(ConfigError::invalid_value(
                    "dispatch.home_resource",
                    format!("not a resource name: {home:?}"),
                ));
            }
        }

        if self.telemetry.logging.enabled {
            hermes_telemetry::logging::create_env_filter(&self.telemetry.logging.level)
                .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;
        }

        let metrics = &self.telemetry.metrics;
        if metrics.enabled {
            if let Some(addr) = &metrics.addr {
                if addr.parse::<std::net::SocketAddr>().is_err() {
                    return Err(ConfigError::invalid_value(
                        "telemetry.metrics.addr",
                        format!("invalid socket address: {addr}"),
                    ));
                }
            }
        }

        if let Some(buckets) = &metrics.duration_buckets {
            let ordered = buckets.windows(2).all(|w| w[0] < w[1]);
            if buckets.is_empty() || !ordered || buckets.iter().any(|b| !b.is_finite()) {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.duration_buckets",
                    "must be finite and strictly increasing",
                ));
            }
        }

        Ok(())
    }

    /// Development preset: verbose failure bodies and pretty debug logs.
    ///
    /// ```
    /// use hermes_config::HermesConfig;
    ///
    /// let config = HermesConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.dispatch.conditions = ErrorPolicy::Verbose;
        config.dispatch.internal_errors = ErrorPolicy::Verbose;

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();

        config
    }

    /// Production preset: terse failures, JSON logs, metrics on.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.dispatch.conditions = ErrorPolicy::Catch;
        config.dispatch.internal_errors = ErrorPolicy::Catch;

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.ansi_enabled = false;
        config.telemetry.environment = "production".to_string();
        config.telemetry.metrics.enabled = true;

        config
    }

    /// Converts the logging section for `hermes_telemetry::init_logging`.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let logging = &self.telemetry.logging;
        LogConfig {
            enabled: logging.enabled,
            level: logging.level.clone(),
            json_format: logging.format == LogFormat::Json,
            ansi: logging.ansi_enabled,
            file_line_info: logging.include_location,
            include_target: true,
        }
    }

    /// Converts the telemetry section for `hermes_telemetry::init_telemetry`.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        let section = &self.telemetry.metrics;
        let mut metrics = MetricsConfig {
            enabled: section.enabled,
            addr: section.addr.clone(),
            ..MetricsConfig::default()
        };
        if let Some(buckets) = &section.duration_buckets {
            metrics.duration_buckets.clone_from(buckets);
        }

        TelemetryConfig {
            service_name: self.telemetry.service_name.clone(),
            environment: self.telemetry.environment.clone(),
            metrics,
            logging: self.to_log_config(),
        }
    }
}

/// Builder for [`HermesConfig`].
#[derive(Debug, Default)]
pub struct HermesConfigBuilder {
    dispatch: Option<DispatchConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl HermesConfigBuilder {
    /// Create a builder with every section unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dispatch section.
    #[must_use]
    pub fn dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Set the telemetry section.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build, defaulting unset sections.
    #[must_use]
    pub fn build(self) -> HermesConfig {
        HermesConfig {
            dispatch: self.dispatch.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<HermesConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoggingConfig, MetricsSection};

    #[test]
    fn test_default_config() {
        let config = HermesConfig::default();
        assert_eq!(config.dispatch.internal_errors, ErrorPolicy::Catch);
        assert_eq!(config.telemetry.service_name, "hermes");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        let dev = HermesConfig::development();
        assert_eq!(dev.dispatch.conditions, ErrorPolicy::Verbose);
        assert_eq!(dev.telemetry.logging.format, LogFormat::Pretty);
        assert!(dev.validate().is_ok());

        let prod = HermesConfig::production();
        assert_eq!(prod.dispatch.conditions, ErrorPolicy::Catch);
        assert!(prod.telemetry.metrics.enabled);
        assert!(prod.validate().is_ok());
    }

    #[test]
    fn test_builder_defaults_unset_sections() {
        let config = HermesConfig::builder()
            .dispatch(DispatchConfig {
                home_resource: Some("index".to_string()),
                ..DispatchConfig::default()
            })
            .build();

        assert_eq!(config.dispatch.home_resource.as_deref(), Some("index"));
        assert_eq!(config.telemetry, TelemetryConfigSection::default());
    }

    #[test]
    fn test_home_resource_with_slash_rejected() {
        let result = HermesConfig::builder()
            .dispatch(DispatchConfig {
                home_resource: Some("a/b".to_string()),
                ..DispatchConfig::default()
            })
            .build_validated();

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut config = HermesConfig::default();
        config.telemetry.logging = LoggingConfig {
            level: "hermes_router=loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(config.validate().is_err());

        config.telemetry.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_metrics_settings_rejected() {
        let mut config = HermesConfig::default();
        config.telemetry.metrics = MetricsSection {
            enabled: true,
            addr: Some("localhost".to_string()),
            duration_buckets: None,
        };
        assert!(config.validate().is_err());

        config.telemetry.metrics.addr = Some("127.0.0.1:9090".to_string());
        config.telemetry.metrics.duration_buckets = Some(vec![0.5, 0.1]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_telemetry_config() {
        let mut config = HermesConfig::development();
        config.telemetry.metrics.duration_buckets = Some(vec![0.01, 0.1]);

        let telemetry = config.to_telemetry_config();
        assert!(!telemetry.logging.json_format);
        assert!(telemetry.logging.file_line_info);
        assert_eq!(telemetry.logging.level, "debug");
        assert_eq!(telemetry.metrics.duration_buckets, vec![0.01, 0.1]);
    }
}
