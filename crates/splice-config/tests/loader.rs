//! Loading configuration from files and the environment.

use splice_config::{ConfigError, ConfigLoader};
use splice_telemetry::LogFormat;
use std::io::Write;

fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file() {
    let file = write_file(
        ".toml",
        r#"
        [pipeline]
        name = "from-file"

        [logging]
        format = "pretty"
        with_target = false
        "#,
    );

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.pipeline.name, "from-file");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(!config.logging.with_target);
}

#[test]
fn test_json_file() {
    let file = write_file(".json", r#"{"logging": {"level": "warn"}}"#);

    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.pipeline.name, "splice");
}

#[test]
fn test_unknown_extension() {
    let file = write_file(".yaml", "pipeline: {}");
    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
}

#[test]
fn test_invalid_toml_file() {
    let file = write_file(".toml", "[pipeline\nname = 1");
    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::TomlError(_)));
}

#[test]
fn test_environment_overrides_file() {
    let file = write_file(".toml", "[pipeline]\nname = \"from-file\"");
    std::env::set_var("SPLICEENVTEST__PIPELINE__NAME", "from-env");
    std::env::set_var("SPLICEENVTEST__LOGGING__FORMAT", "compact");

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_env_prefix("spliceenvtest")
        .load()
        .unwrap();

    assert_eq!(config.pipeline.name, "from-env");
    assert_eq!(config.logging.format, LogFormat::Compact);
}

#[test]
fn test_invalid_environment_value() {
    std::env::set_var("SPLICEBADENV__PIPELINE__TRACE_STAGES", "sometimes");

    let err = ConfigLoader::new()
        .with_env_prefix("SPLICEBADENV")
        .load()
        .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::EnvOverride { var, .. } if var == "SPLICEBADENV__PIPELINE__TRACE_STAGES"
    ));
}
