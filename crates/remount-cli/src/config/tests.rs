use crate::config::*;
use crate::error::{CliError, ConfigError};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::path::Path;
use tempfile::TempDir;

fn load(dir: &Path, overrides: CliOverrides) -> crate::error::Result<RemountConfig> {
    RemountConfig::load(None, dir, &overrides)
}

#[test]
#[serial]
fn test_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let config = load(dir.path(), CliOverrides::default()).unwrap();
    assert_eq!(config, RemountConfig::default());
    assert_eq!(config.port, 5000);
    assert_eq!(config.index_file, "routes.toml");
    assert_eq!(config.vendor_dirs, ["node_modules", "vendor", "target"]);
    assert_eq!(config.settle().as_millis(), 50);
}

#[test]
#[serial]
fn test_file_then_env_then_cli() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "port = 6000\nsettle_ms = 0\nindex_file = \"mocks.toml\"\ncors = false\n",
    )
    .unwrap();

    let config = load(dir.path(), CliOverrides::default()).unwrap();
    assert_eq!(config.port, 6000);
    assert_eq!(config.settle_ms, 0);
    assert_eq!(config.index_file, "mocks.toml");
    assert!(!config.cors);

    unsafe { std::env::set_var("REMOUNT_PORT", "7000") };
    let from_env = load(dir.path(), CliOverrides::default());
    let from_cli = load(
        dir.path(),
        CliOverrides {
            port: Some(8000),
            host: Some("0.0.0.0".to_string()),
        },
    );
    unsafe { std::env::remove_var("REMOUNT_PORT") };

    assert_eq!(from_env.unwrap().port, 7000);
    let from_cli = from_cli.unwrap();
    assert_eq!(from_cli.port, 8000);
    assert_eq!(from_cli.host, "0.0.0.0");
}

#[test]
#[serial]
fn test_explicit_config_must_exist() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = RemountConfig::load(Some(&missing), dir.path(), &CliOverrides::default())
        .unwrap_err();
    assert!(matches!(err, CliError::Config(ConfigError::NotFound(p)) if p == missing));
}

#[test]
#[serial]
fn test_bad_types_are_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "port = \"high\"\n").unwrap();
    let err = load(dir.path(), CliOverrides::default()).unwrap_err();
    assert!(matches!(
        err,
        CliError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "configuration"
    ));
}

#[test]
fn test_validation() {
    assert!(RemountConfig::default().validate().is_ok());

    let bad_host = RemountConfig {
        host: "localhost:5000".to_string(),
        ..RemountConfig::default()
    };
    assert!(bad_host.validate().is_err());

    let no_scan = RemountConfig {
        port_scan_limit: 0,
        ..RemountConfig::default()
    };
    assert!(no_scan.validate().is_err());

    let absolute_index = RemountConfig {
        index_file: "/etc/routes.toml".to_string(),
        ..RemountConfig::default()
    };
    assert!(absolute_index.validate().is_err());

    let nested_vendor = RemountConfig {
        vendor_dirs: vec!["deps/cache".to_string()],
        ..RemountConfig::default()
    };
    assert!(nested_vendor.validate().is_err());
}

#[test]
fn test_dependency_filter_uses_vendor_dirs_and_roots() {
    let config = RemountConfig {
        vendor_dirs: vec!["fixtures-cache".to_string()],
        exclude_roots: vec!["/opt/shared".into()],
        ..RemountConfig::default()
    };
    let filter = config.dependency_filter();
    assert!(filter.is_excluded(Path::new("/srv/fixtures-cache/a.json")));
    assert!(filter.is_excluded(Path::new("/opt/shared/routes.toml")));
    assert!(!filter.is_excluded(Path::new("/srv/node_modules/a.json")));
}

#[test]
fn test_localhost_host() {
    let config = RemountConfig {
        host: "localhost".to_string(),
        ..RemountConfig::default()
    };
    assert_eq!(
        config.host_addr().unwrap(),
        std::net::IpAddr::from([127, 0, 0, 1])
    );
}
