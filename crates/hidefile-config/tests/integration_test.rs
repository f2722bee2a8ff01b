//! Integration tests for hidefile-config
//!
//! These tests exercise config loading against real files in a temp directory.

use std::path::PathBuf;

use hidefile_config::{Config, ConfigError};
use tempfile::tempdir;

#[test]
fn test_load_global_config_from_file() {
    let temp = tempdir().unwrap();
    let global = temp.path().join("config.toml");
    std::fs::write(
        &global,
        r#"
[policy]
hidden = [".git", "node_modules"]
blocked = [".key"]

[logging]
level = "debug"

[layer]
library = "/opt/hidefile/libhidefile_inception_layer.so"
"#,
    )
    .unwrap();

    let config = Config::load_from(Some(&global), &temp.path().join("missing.toml")).unwrap();
    assert_eq!(config.policy.hidden, vec![".git", "node_modules"]);
    assert_eq!(config.policy.blocked, vec![".key"]);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.layer.library,
        Some(PathBuf::from("/opt/hidefile/libhidefile_inception_layer.so"))
    );
}

#[test]
fn test_config_hierarchy_project_overrides_global() {
    let temp = tempdir().unwrap();
    let global = temp.path().join("global.toml");
    let project = temp.path().join("project.toml");
    std::fs::write(
        &global,
        r#"
[policy]
hidden = [".git"]
blocked = [".key", ".pem"]
"#,
    )
    .unwrap();
    std::fs::write(
        &project,
        r#"
[policy]
hidden = ["target"]
"#,
    )
    .unwrap();

    let config = Config::load_from(Some(&global), &project).unwrap();
    assert_eq!(config.policy.hidden, vec!["target"]);
    // Lists the project leaves empty keep the global value.
    assert_eq!(config.policy.blocked, vec![".key", ".pem"]);
}

#[test]
fn test_missing_files_yield_defaults() {
    let temp = tempdir().unwrap();
    let config = Config::load_from(
        Some(&temp.path().join("nope.toml")),
        &temp.path().join("also-nope.toml"),
    )
    .unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_config_fills_defaults() {
    let temp = tempdir().unwrap();
    let project = temp.path().join("config.toml");
    std::fs::write(&project, "[policy]\nblocked = [\".secret\"]\n").unwrap();

    let config = Config::load_from(None, &project).unwrap();
    assert!(config.policy.hidden.is_empty());
    assert_eq!(config.policy.blocked, vec![".secret"]);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_toml_is_error() {
    let temp = tempdir().unwrap();
    let project = temp.path().join("config.toml");
    std::fs::write(&project, "[policy\nhidden = ").unwrap();

    let err = Config::load_from(None, &project).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_default_toml_parses_back() {
    let generated = Config::default_toml().unwrap();
    let parsed: Config = toml::from_str(&generated).unwrap();
    assert_eq!(parsed, Config::default());
}
