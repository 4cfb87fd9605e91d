use itemdef_types::DefinitionFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration loaded from itemdef.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemdefConfig {
    /// Render configuration
    #[serde(default)]
    pub render: RenderConfig,

    /// Additional or replacement definition formats
    #[serde(default)]
    pub formats: Vec<DefinitionFormat>,
}

/// Render configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Directory that receives rendered definition parts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build/definition")
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            output_dir: default_output_dir(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
