//! Service configuration resolution from a TOML file

use std::io::Write;
use veil_di::config::{CliOverrides, ServiceConfig, DEFAULT_PORT};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn test_toml_values_apply() {
    let file = write_config(
        r#"
        port = 6100
        bind_address = "0.0.0.0"

        [logging]
        level = "debug"

        [upload]
        tick_interval_ms = 20
        settle_delay_ms = 0
        accepted_extensions = ["pdf"]
        auto_start_workflow = false

        [qa]
        reprocess_delay_ms = 10
        "#,
    );

    let config = ServiceConfig::resolve(&CliOverrides {
        config: Some(file.path().to_path_buf()),
        ..CliOverrides::default()
    })
    .expect("resolve");

    assert_eq!(config.port, 6100);
    assert_eq!(config.listen_address(), "0.0.0.0:6100");
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.upload.tick_interval_ms, 20);
    assert_eq!(config.upload.settle_delay_ms, 0);
    assert_eq!(config.upload.progress_step, 10);
    assert!(!config.upload.accepts_extension("docx"));
    assert!(!config.upload.auto_start_workflow);
    assert_eq!(config.qa.reprocess_delay_ms, 10);
    assert_eq!(config.config_path.as_deref(), Some(file.path()));
}

#[test]
fn test_cli_overrides_toml() {
    let file = write_config("port = 6100\n");

    let config = ServiceConfig::resolve(&CliOverrides {
        config: Some(file.path().to_path_buf()),
        port: Some(7000),
        log_level: Some("warn".to_string()),
        ..CliOverrides::default()
    })
    .expect("resolve");

    assert_eq!(config.port, 7000);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");

    let config = ServiceConfig::resolve(&CliOverrides {
        config: Some(dir.path().join("absent.toml")),
        ..CliOverrides::default()
    })
    .expect("resolve");

    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.bind_address, "127.0.0.1");
    assert_eq!(config.upload.tick_interval_ms, 100);
    assert_eq!(config.qa.reprocess_delay_ms, 3000);
    assert!(config.config_path.is_none());
}

#[test]
fn test_invalid_upload_settings_rejected() {
    let file = write_config("[upload]\nprogress_step = 0\n");

    let result = ServiceConfig::resolve(&CliOverrides {
        config: Some(file.path().to_path_buf()),
        ..CliOverrides::default()
    });

    assert!(matches!(result, Err(veil_common::Error::Config(_))));
}

#[test]
fn test_malformed_file_rejected() {
    let file = write_config("port = [not toml");

    let result = ServiceConfig::resolve(&CliOverrides {
        config: Some(file.path().to_path_buf()),
        ..CliOverrides::default()
    });

    assert!(matches!(result, Err(veil_common::Error::Config(_))));
}
