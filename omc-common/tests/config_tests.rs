//! Config file discovery and parsing
//!
//! Tests that change XDG_CONFIG_HOME are marked #[serial] so they never run
//! in parallel with each other.

use omc_common::config::{default_config_path, LogFormat, Settings, SettingsOverrides, TomlConfig};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_user_config(config_home: &Path, content: &str) {
    let dir = config_home.join("omc");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), content).unwrap();
}

#[test]
#[serial]
fn test_user_config_is_discovered() {
    let temp = TempDir::new().unwrap();
    write_user_config(
        temp.path(),
        r#"
        port = 9123
        data_folder = "/srv/omc/data"

        [osu]
        client_id = "42"
        client_secret = "hunter2"
        request_interval_ms = 10

        [logging]
        level = "debug"
        format = "json"
        "#,
    );
    env::set_var("XDG_CONFIG_HOME", temp.path());

    let found = default_config_path();
    let config = TomlConfig::load(None);
    env::remove_var("XDG_CONFIG_HOME");

    assert_eq!(found, Some(temp.path().join("omc").join("config.toml")));
    let config = config.unwrap();
    assert_eq!(config.port, Some(9123));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);

    let settings = Settings::resolve(SettingsOverrides::default(), config).unwrap();
    assert_eq!(settings.port, 9123);
    assert_eq!(settings.data_folder, Path::new("/srv/omc/data"));
    assert_eq!(settings.osu.client_id, "42");
    assert_eq!(settings.osu.request_interval_ms, 10);
}

#[test]
#[serial]
fn test_missing_default_file_falls_back_to_defaults() {
    if Path::new("/etc/omc/config.toml").exists() {
        // A system-wide config on the test host would be picked up
        return;
    }

    let temp = TempDir::new().unwrap();
    env::set_var("XDG_CONFIG_HOME", temp.path());
    let config = TomlConfig::load(None);
    env::remove_var("XDG_CONFIG_HOME");

    let config = config.unwrap();
    assert_eq!(config.port, None);
    assert_eq!(config.logging.level, "info");
}

#[test]
#[serial]
fn test_malformed_default_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    write_user_config(temp.path(), "port = \"not a number\"\n");
    env::set_var("XDG_CONFIG_HOME", temp.path());
    let config = TomlConfig::load(None);
    env::remove_var("XDG_CONFIG_HOME");

    assert!(config.is_err());
}

#[test]
fn test_explicit_path_must_exist() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");
    assert!(TomlConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_explicit_path_is_used() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.toml");
    fs::write(&path, "bind = \"0.0.0.0\"\nmax_ids_per_request = 100\n").unwrap();

    let config = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(config.bind.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.max_ids_per_request, Some(100));
}
