use std::fs;

use kgpart_core::config::{
    DEFAULT_DATA_DIR, DEFAULT_FEEDBACK_PREVIEW_LIMIT, DEFAULT_SIMILARITY_THRESHOLD,
    DEFAULT_SUMMARY_PREVIEW_LIMIT,
};
use kgpart_core::{Config, ConfigError};
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.workspace.data_dir, DEFAULT_DATA_DIR);
    assert_eq!(config.similarity.threshold, DEFAULT_SIMILARITY_THRESHOLD);
    assert_eq!(
        config.validation.feedback_preview_limit,
        DEFAULT_FEEDBACK_PREVIEW_LIMIT
    );
    assert_eq!(
        config.validation.summary_preview_limit,
        DEFAULT_SUMMARY_PREVIEW_LIMIT
    );
    assert_eq!(config.merge.initial_version, "0.1.0");
}

#[test]
fn test_config_to_toml() {
    let toml_str = Config::default_config_string();
    assert!(toml_str.contains("[workspace]"));
    assert!(toml_str.contains("[validation]"));
    assert!(toml_str.contains("[similarity]"));
    assert!(toml_str.contains("[merge]"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[workspace]
data_dir = "raw"

[similarity]
threshold = 0.75

[merge]
bump_unchanged = false
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.workspace.data_dir, "raw");
    assert_eq!(config.workspace.partitions_dir, "partitions");
    assert_eq!(config.similarity.threshold, 0.75);
    assert_eq!(config.similarity.strong_match, 0.85);
    assert!(!config.merge.bump_unchanged);
    assert_eq!(config.merge.description_separator, " | ");
}

#[test]
fn test_from_file_validates() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("kgpart.toml");

    fs::write(&path, "[similarity]\ntype_weight = 2.0\n").unwrap();
    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::Invalid(_))
    ));

    fs::write(&path, "[similarity\n").unwrap();
    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::ParseError(_))
    ));

    assert!(matches!(
        Config::from_file(temp_dir.path().join("missing.toml")),
        Err(ConfigError::ReadError(_))
    ));
}
