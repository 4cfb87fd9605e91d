#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Writes assembled definition parts below a root directory.
pub struct OutputWriter {
    root_path: PathBuf,
}

impl OutputWriter {
    pub fn new(root_path: PathBuf) -> Self {
        OutputWriter { root_path }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Target file for a definition part path such as `StaticResources/theme.json`.
    ///
    /// Absolute paths and `..` components are rejected so parts stay inside the root.
    pub fn part_path(&self, part_path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(part_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if part_path.is_empty() || escapes {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "Definition part path '{}' cannot be written below {}",
                    part_path,
                    self.root_path.display()
                ),
            )
            .with_code("DEF-OUT-001"));
        }
        Ok(self.root_path.join(relative))
    }

    pub fn write_part(&self, part_path: &str, content: &[u8]) -> Result<PathBuf, AppError> {
        let target = self.part_path(part_path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::new(
                    ErrorCategory::IoError,
                    format!("Failed to create output directory {}: {}", parent.display(), e),
                )
            })?;
        }
        fs::write(&target, content).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to write definition part {}: {}", target.display(), e),
            )
        })?;
        Ok(target)
    }
}
