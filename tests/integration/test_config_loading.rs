use itemdef::core::config::{ConfigLoader, ConfigValidator};
use itemdef::core::definition::FormatRegistry;
use itemdef::core::types::ErrorCategory;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_itemdef_env() {
    for v in &["ITEMDEF_OUTPUT_DIR", "ITEMDEF_LOG_LEVEL", "ITEMDEF_LOG_DIR"] {
        env::remove_var(v);
    }
}

#[test]
#[serial]
fn test_config_loading_integration() {
    clear_itemdef_env();
    let temp_dir = TempDir::new().unwrap();
    let workspace_path = temp_dir.path();

    let config_content = r#"
[render]
output_dir = "dist/definition"

[[formats]]
item_type = "Widget"
format = "v1"
paths = ["widget.json", "widget.platform"]

[[formats]]
item_type = "Eventstream"
paths = ["eventstream.json"]

[logging]
default_level = "debug"
"#;
    fs::write(workspace_path.join("itemdef.toml"), config_content).unwrap();

    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();
    ConfigValidator::validate(&config).unwrap();
    assert_eq!(config.render.output_dir, PathBuf::from("dist/definition"));
    assert_eq!(config.formats.len(), 2);

    let registry = FormatRegistry::with_overrides(&config.formats);
    let widget = registry.lookup("widget", Some("V1")).unwrap();
    assert!(widget.allows("widget.platform"));
    let eventstream = registry.lookup("Eventstream", None).unwrap();
    assert!(!eventstream.allows("eventstreamProperties.json"));
}

#[test]
#[serial]
fn test_env_overrides_config_file() {
    clear_itemdef_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("itemdef.toml"),
        "[render]\noutput_dir = \"from-file\"\n",
    )
    .unwrap();

    env::set_var("ITEMDEF_OUTPUT_DIR", "from-env");
    let config = ConfigLoader::load_from_workspace(temp_dir.path());
    clear_itemdef_env();

    assert_eq!(config.unwrap().render.output_dir, PathBuf::from("from-env"));
}

#[test]
#[serial]
fn test_missing_config_uses_defaults() {
    clear_itemdef_env();
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    assert_eq!(config.render.output_dir, PathBuf::from("build/definition"));
    assert!(config.formats.is_empty());
}

#[test]
#[serial]
fn test_malformed_config_is_a_config_error() {
    clear_itemdef_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("itemdef.toml"), "[render\noutput_dir = 1").unwrap();

    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ConfigError);
    assert!(err.message.contains("Failed to parse config file"));
}

#[test]
#[serial]
fn test_validator_rejects_empty_format_entries() {
    clear_itemdef_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("itemdef.toml"),
        "[[formats]]\nitem_type = \"Widget\"\npaths = [\"\"]\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    let err = ConfigValidator::validate(&config).unwrap_err();
    assert!(err.message.contains("empty path"));
}
