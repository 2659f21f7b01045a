//! Loading configuration files from disk.

use std::io::Write;

use hermes_config::{ConfigError, ConfigLoader, LogFormat};
use hermes_core::ErrorPolicy;
use tempfile::Builder;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn complete_toml_file() {
    let file = write_temp(
        ".toml",
        r#"
        [dispatch]
        conditions = "verbose"
        internal_errors = "catch"
        home_resource = "index"

        [telemetry]
        service_name = "catalog"
        environment = "staging"

        [telemetry.metrics]
        enabled = true
        addr = "127.0.0.1:9090"
        duration_buckets = [0.001, 0.01, 0.1]

        [telemetry.logging]
        enabled = true
        level = "hermes_router=debug,info"
        format = "pretty"
        ansi_enabled = true
        include_location = true
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.dispatch.conditions, ErrorPolicy::Verbose);
    assert_eq!(config.dispatch.home_resource.as_deref(), Some("index"));
    assert_eq!(config.telemetry.environment, "staging");
    assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);

    let telemetry = config.to_telemetry_config();
    assert_eq!(telemetry.metrics.duration_buckets, vec![0.001, 0.01, 0.1]);
    assert_eq!(telemetry.metrics.addr.as_deref(), Some("127.0.0.1:9090"));
}

#[test]
fn json_file() {
    let file = write_temp(".json", r#"{"telemetry": {"service_name": "inventory"}}"#);
    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config.telemetry.service_name, "inventory");
}

#[test]
fn file_replaces_preset_layer() {
    let file = write_temp(".toml", "[telemetry]\nservice_name = \"catalog\"\n");
    let config = ConfigLoader::new()
        .with_development()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.dispatch.conditions, ErrorPolicy::Catch);
    assert_eq!(config.telemetry.logging.format, LogFormat::Json);
}

#[test]
fn unsupported_extension() {
    let file = write_temp(".yaml", "dispatch: {}\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn unknown_field_in_file() {
    let file = write_temp(".toml", "[dispatch]\nretries = 3\n");
    let result = ConfigLoader::new().with_optional_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}
