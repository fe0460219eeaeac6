//! Config file loading tests

use retain_common::config::TomlConfig;
use std::io::Write;

#[test]
fn test_load_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retain.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
port = 5280
scoring_base_url = "http://scoring.internal:8000"
conflict_policy = "advisory"
max_row_errors = 25
"#
    )
    .unwrap();

    let config = TomlConfig::load(Some(&path)).expect("load failed");
    assert_eq!(config.port, Some(5280));
    assert_eq!(
        config.scoring_base_url.as_deref(),
        Some("http://scoring.internal:8000")
    );
    assert_eq!(config.conflict_policy.as_deref(), Some("advisory"));
    assert_eq!(config.max_row_errors, Some(25));
    assert_eq!(config.database_path, None);
}

#[test]
fn test_missing_explicit_path_is_error() {
    let result = TomlConfig::load(Some(std::path::Path::new("/nonexistent/retain.toml")));
    assert!(result.is_err());
}

#[test]
fn test_malformed_config_is_error_not_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retain.toml");
    std::fs::write(&path, "port = \"not a number").unwrap();

    let result = TomlConfig::load(Some(&path));
    assert!(result.is_err(), "parse failure must surface, not fall back");
}
