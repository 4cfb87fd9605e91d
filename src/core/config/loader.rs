#![allow(clippy::result_large_err)]

use super::ItemdefConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in a workspace.
pub const CONFIG_FILE_NAME: &str = "itemdef.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/itemdef.toml)
    /// Environment variables override config file values
    pub fn load_from_workspace(workspace_path: &Path) -> Result<ItemdefConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        Self::load(&config_path)
    }

    /// Load config from an explicit file, falling back to defaults when it is missing
    pub fn load(config_path: &Path) -> Result<ItemdefConfig, AppError> {
        let mut config = Self::load_from_file(config_path)?.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<ItemdefConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: ItemdefConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(config: &mut ItemdefConfig) {
        if let Ok(output_dir) = env::var("ITEMDEF_OUTPUT_DIR") {
            if !output_dir.trim().is_empty() {
                config.render.output_dir = PathBuf::from(output_dir);
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "ITEMDEF_OUTPUT_DIR - Override render output directory (default: build/definition)",
            "ITEMDEF_LOG_LEVEL - Override default log level (default: info)",
            "ITEMDEF_LOG_DIR - Override log file directory (default: .itemdef/logs)",
            "ITEMDEF_LOG - Tracing filter directives, takes precedence over RUST_LOG",
        ]
    }
}
