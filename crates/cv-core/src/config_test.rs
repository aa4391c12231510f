use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_minimal_config_uses_defaults() {
    let file = write_config(
        r#"
name: finance-migration
source:
  endpoint: "source.example.net"
target:
  endpoint: "target.example.net"
"#,
    );

    let config = MigrationConfig::load(file.path()).unwrap();
    assert_eq!(config.name, "finance-migration");
    assert_eq!(config.output_dir, "runs");
    assert_eq!(config.tools.extract, "wh-extract");
    assert_eq!(config.poll.interval_secs, 10);
    assert_eq!(config.poll.timeout_secs, 600);
    assert!(config.source.credential_env.is_none());
}

#[test]
fn test_full_config_overrides() {
    let file = write_config(
        r#"
name: finance-migration
source:
  endpoint: "source.example.net"
  credential_env: SOURCE_TOKEN
target:
  endpoint: "target.example.net"
  credential_env: TARGET_TOKEN
output_dir: /var/caravan/runs
tools:
  catalog: my-catalog
  extract: my-extract
  build: my-build
  deploy: my-deploy
poll:
  interval_secs: 5
  timeout_secs: 120
"#,
    );

    let config = MigrationConfig::load(file.path()).unwrap();
    assert_eq!(config.output_dir, "/var/caravan/runs");
    assert_eq!(config.tools.catalog, "my-catalog");
    assert_eq!(config.poll.interval(), std::time::Duration::from_secs(5));
    assert_eq!(
        config.source.credential_env.as_deref(),
        Some("SOURCE_TOKEN")
    );
}

#[test]
fn test_missing_file_is_config_not_found() {
    let result = MigrationConfig::load(std::path::Path::new("/nonexistent/caravan.yml"));
    assert!(matches!(
        result.unwrap_err(),
        CoreError::ConfigNotFound { .. }
    ));
}

#[test]
fn test_unknown_field_rejected() {
    let file = write_config(
        r#"
name: x
source:
  endpoint: "a"
target:
  endpoint: "b"
surprise: true
"#,
    );

    let result = MigrationConfig::load(file.path());
    assert!(matches!(result.unwrap_err(), CoreError::YamlParse(_)));
}

#[test]
fn test_empty_endpoint_rejected() {
    let file = write_config(
        r#"
name: x
source:
  endpoint: ""
target:
  endpoint: "b"
"#,
    );

    let result = MigrationConfig::load(file.path());
    assert!(matches!(
        result.unwrap_err(),
        CoreError::ConfigInvalid { .. }
    ));
}

#[test]
fn test_zero_poll_interval_rejected() {
    let file = write_config(
        r#"
name: x
source:
  endpoint: "a"
target:
  endpoint: "b"
poll:
  interval_secs: 0
"#,
    );

    let result = MigrationConfig::load(file.path());
    assert!(matches!(
        result.unwrap_err(),
        CoreError::ConfigInvalid { .. }
    ));
}
