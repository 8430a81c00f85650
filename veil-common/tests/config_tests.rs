//! Tests for configuration discovery and graceful degradation
//!
//! - Missing TOML files SHALL NOT cause termination
//! - Malformed TOML files are reported as configuration errors
//! - CLI → ENV → TOML → default priority for individual settings
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.

use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use veil_common::config::{load_toml_config, resolve_config_path, resolve_setting, LoggingConfig};
use veil_common::Error;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct TestConfig {
    port: Option<u16>,
    #[serde(default)]
    logging: LoggingConfig,
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_logging_config_defaults_to_info() {
    assert_eq!(LoggingConfig::default().level, "info");
}

#[test]
fn test_missing_path_uses_defaults() {
    let config: TestConfig = load_toml_config(None).expect("defaults");
    assert_eq!(config, TestConfig::default());
}

#[test]
fn test_nonexistent_file_uses_defaults() {
    let path = Path::new("/nonexistent/veil/veil-test.toml");
    let config: TestConfig = load_toml_config(Some(path)).expect("defaults");
    assert_eq!(config.port, None);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_valid_file_is_parsed() {
    let file = write_config("port = 6000\n\n[logging]\nlevel = \"debug\"\n");
    let config: TestConfig = load_toml_config(Some(file.path())).expect("parse");
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_logging_section_without_level_keeps_default() {
    let file = write_config("[logging]\n");
    let config: TestConfig = load_toml_config(Some(file.path())).expect("parse");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("port = \"not a number\"\n");
    let result: Result<TestConfig, Error> = load_toml_config(Some(file.path()));
    match result {
        Err(Error::Config(message)) => assert!(message.contains("Parse")),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_config_path_cli_beats_env() {
    env::set_var("VEIL_TEST_CONFIG", "/tmp/from-env.toml");

    let path = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")), "VEIL_TEST_CONFIG", "veil-test");
    assert_eq!(path, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var("VEIL_TEST_CONFIG");
}

#[test]
#[serial]
fn test_config_path_from_env() {
    env::set_var("VEIL_TEST_CONFIG", "/tmp/from-env.toml");

    let path = resolve_config_path(None, "VEIL_TEST_CONFIG", "veil-test");
    assert_eq!(path, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var("VEIL_TEST_CONFIG");
}

#[test]
#[serial]
fn test_setting_priority_order() {
    env::remove_var("VEIL_TEST_PORT");

    // CLI wins over everything
    env::set_var("VEIL_TEST_PORT", "7000");
    assert_eq!(resolve_setting(Some(8000u16), "VEIL_TEST_PORT", Some(9000), 5731), 8000);

    // ENV wins over TOML
    assert_eq!(resolve_setting(None, "VEIL_TEST_PORT", Some(9000u16), 5731), 7000);

    // TOML wins over default
    env::remove_var("VEIL_TEST_PORT");
    assert_eq!(resolve_setting(None, "VEIL_TEST_PORT", Some(9000u16), 5731), 9000);

    // Default last
    assert_eq!(resolve_setting::<u16>(None, "VEIL_TEST_PORT", None, 5731), 5731);
}

#[test]
#[serial]
fn test_unparseable_env_setting_is_ignored() {
    env::set_var("VEIL_TEST_PORT", "not-a-port");

    assert_eq!(resolve_setting(None, "VEIL_TEST_PORT", Some(9000u16), 5731), 9000);

    env::remove_var("VEIL_TEST_PORT");
}
