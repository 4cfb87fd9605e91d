#![allow(clippy::result_large_err)]

use super::ItemdefConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::collections::HashSet;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &ItemdefConfig) -> Result<(), AppError> {
        if config.render.output_dir.as_os_str().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "render.output_dir cannot be empty",
            ));
        }

        let mut keys = HashSet::new();
        for (index, format) in config.formats.iter().enumerate() {
            if format.item_type.trim().is_empty() {
                return Err(AppError::new(
                    ErrorCategory::ConfigError,
                    format!("formats[{}].item_type cannot be empty", index),
                ));
            }
            if format.paths.is_empty() {
                return Err(AppError::new(
                    ErrorCategory::ConfigError,
                    format!(
                        "formats[{}] ({}) must declare at least one path",
                        index, format.item_type
                    ),
                ));
            }
            if format.paths.iter().any(|path| path.trim().is_empty()) {
                return Err(AppError::new(
                    ErrorCategory::ConfigError,
                    format!("formats[{}] ({}) contains an empty path", index, format.item_type),
                ));
            }
            let key = (
                format.item_type.to_ascii_lowercase(),
                format.format.as_deref().map(str::to_ascii_lowercase),
            );
            if !keys.insert(key) {
                return Err(AppError::new(
                    ErrorCategory::ConfigError,
                    format!(
                        "formats[{}] duplicates {} ({})",
                        index,
                        format.item_type,
                        format.format_label()
                    ),
                ));
            }
        }

        Ok(())
    }
}
