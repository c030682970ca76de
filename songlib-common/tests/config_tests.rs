//! Tests for configuration loading and resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate SONGLIB_CONFIG are marked with #[serial].

use serial_test::serial;
use songlib_common::config::{resolve_config_path, CatalogConfig, LogEnv, CONFIG_PATH_ENV};
use std::env;
use std::path::PathBuf;

#[test]
fn test_full_toml_parses() {
    let config = CatalogConfig::from_toml_str(
        r#"
        env = "prod"

        [server]
        host = "0.0.0.0"
        port = 8090

        [database]
        path = "/var/lib/songlib/catalog.db"

        [catalog]
        page_size = 10
        verses_per_page = 3

        [lookup]
        base_url = "http://localhost:9000"
        timeout_secs = 3
        "#,
    )
    .expect("Should parse TOML");

    assert_eq!(config.env, LogEnv::Prod);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8090);
    assert_eq!(config.database.path, PathBuf::from("/var/lib/songlib/catalog.db"));
    assert_eq!(config.catalog.page_size, 10);
    assert_eq!(config.catalog.verses_per_page, 3);
    assert_eq!(config.lookup.base_url.as_deref(), Some("http://localhost:9000"));
    assert_eq!(config.lookup.timeout_secs, 3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = CatalogConfig::from_toml_str("[server]\nport = 9999\n").unwrap();

    assert_eq!(config.server.port, 9999);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.env, LogEnv::Local);
    assert_eq!(config.catalog.page_size, 5);
}

#[test]
fn test_unknown_env_rejected() {
    let result = CatalogConfig::from_toml_str("env = \"staging\"\n");
    assert!(result.is_err());
}

#[test]
fn test_zero_page_size_invalid() {
    let config = CatalogConfig::from_toml_str("[catalog]\npage_size = 0\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_bad_lookup_url_invalid() {
    let config = CatalogConfig::from_toml_str("[lookup]\nbase_url = \"ftp://x\"\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_explicit_missing_file_errors() {
    let result = CatalogConfig::load(Some(&PathBuf::from("/nonexistent/songlib.toml")));
    assert!(result.is_err());
}

#[test]
fn test_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[catalog]\nverses_per_page = 4\n").unwrap();

    let config = CatalogConfig::load(Some(&path)).unwrap();
    assert_eq!(config.catalog.verses_per_page, 4);
}

#[test]
#[serial]
fn test_resolve_config_path_cli_wins() {
    env::set_var(CONFIG_PATH_ENV, "/tmp/from-env.toml");

    let path = resolve_config_path(Some("/tmp/from-cli.toml"));
    assert_eq!(path, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var(CONFIG_PATH_ENV);
}

#[test]
#[serial]
fn test_resolve_config_path_env() {
    env::set_var(CONFIG_PATH_ENV, "/tmp/from-env.toml");

    let path = resolve_config_path(None);
    assert_eq!(path, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_PATH_ENV);
}

#[test]
#[serial]
fn test_resolve_config_path_none() {
    env::remove_var(CONFIG_PATH_ENV);
    assert_eq!(resolve_config_path(None), None);
}
