//! Typed, layered configuration for the Hermes dispatch engine.
//!
//! [`HermesConfig`] holds two sections:
//!
//! - [`DispatchConfig`] - failure policies and the home resource
//! - [`TelemetryConfigSection`] - logging and metrics
//!
//! [`ConfigLoader`] layers defaults, a TOML or JSON file, and environment
//! variables, then validates. Unknown fields are rejected.
//!
//! # Configuration File Format
//!
//! ```toml
//! [dispatch]
//! conditions = "catch"          # propagate | catch | verbose
//! internal_errors = "verbose"
//! home_resource = "index"
//!
//! [telemetry]
//! service_name = "catalog"
//! environment = "production"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Keys use `PREFIX__SECTION__KEY`, e.g. `HERMES__DISPATCH__CONDITIONS=verbose`
//! or `HERMES__TELEMETRY__LOGGING__LEVEL=debug`.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{HermesConfig, HermesConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{DispatchConfig, LogFormat, LoggingConfig, MetricsSection, TelemetryConfigSection};
