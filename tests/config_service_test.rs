use std::path::{Path, PathBuf};

use serde_json::json;
use soa_recipe::config::service::read_files;
use soa_recipe::config::{loader, ConfigError, ConfigService};
use soa_recipe::framework::{Service, ServiceContext, ServiceError};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn launch_with(files: Vec<PathBuf>) -> Result<ConfigService, ServiceError> {
    let ctx = ServiceContext::default();
    let mut service = ConfigService::new();
    service.configure(&ctx, Some(json!({ "files": files })))?;
    service.bootstrap(&ctx)?;
    service.launch(&ctx)?;
    Ok(service)
}

#[test]
fn test_merges_json_and_toml_files() {
    let service = launch_with(vec![fixture("config-1.json"), fixture("config-2.toml")])
        .expect("Failed to load config");

    assert_eq!(service.get("foo"), Some(&json!(1)));
    assert_eq!(service.get("bar"), Some(&json!("ok")));
    assert_eq!(service.get("nested.bar"), Some(&json!(1)));
    assert_eq!(service.get("nested.foo"), Some(&json!("ok")));
}

#[test]
fn test_ignores_missing_files() {
    let service = launch_with(vec![fixture("config-1.json"), fixture("config-does-not-exist.json")])
        .expect("Missing files must be skipped");

    assert_eq!(service.get("foo"), Some(&json!(1)));
    assert_eq!(loader::load_fragment(&fixture("nope.toml")).unwrap(), None);
}

#[test]
fn test_exposes_the_config_hash() {
    let service = read_files(&[fixture("config-1.json"), fixture("config-2.toml")])
        .expect("Failed to load config");
    let config = service.config();

    assert_eq!(config["foo"], json!(1));
    assert_eq!(config["bar"], json!("ok"));
    assert_eq!(config["nested"]["bar"], json!(1));
    assert_eq!(config["nested"]["foo"], json!("ok"));
}

#[test]
fn test_reading_again_starts_from_scratch() {
    let mut service = read_files(&[fixture("config-1.json")]).expect("Failed to load config");
    assert_eq!(service.get("foo"), Some(&json!(1)));

    service.set_files([fixture("config-2.toml")]);
    service.read_config().expect("Failed to reload config");

    assert_eq!(service.get("foo"), None);
    assert_eq!(service.get("bar"), Some(&json!("ok")));
}

#[test]
fn test_failed_reload_keeps_previous_config() {
    let mut service = read_files(&[fixture("config-1.json")]).expect("Failed to load config");

    service.set_files([fixture("config-2.toml"), fixture("broken.json")]);
    let err = service.read_config().unwrap_err();
    assert!(matches!(err, ConfigError::Json { .. }), "got {err:?}");

    assert_eq!(service.get("foo"), Some(&json!(1)));
    assert_eq!(service.get("bar"), Some(&json!(1)));
    assert_eq!(service.get("nested.foo"), Some(&json!(1)));
}

#[test]
fn test_broken_files_are_errors() {
    let err = read_files(&[fixture("broken.json")]).unwrap_err();
    assert!(matches!(err, ConfigError::Json { .. }), "got {err:?}");

    let err = read_files(&[fixture("notes.txt")]).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)), "got {err:?}");

    let err = launch_with(vec![fixture("broken.json")]).unwrap_err();
    assert!(matches!(err, ServiceError::Config(ConfigError::Json { .. })), "got {err:?}");
}
