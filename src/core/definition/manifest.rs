#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::pipeline::PartInput;
use crate::core::types::ErrorCategory;
use itemdef_types::PartConfig;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the raw bytes of a definition part come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceLocator {
    /// File path, relative to the manifest directory unless absolute.
    File(PathBuf),
    /// Inline document, serialized as compact JSON.
    Inline(Map<String, Value>),
}

/// One `definition."<path>"` entry of a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartEntry {
    pub source: SourceLocator,
    #[serde(flatten)]
    pub config: PartConfig,
}

/// Configured parts in declaration order.
///
/// A repeated path is kept as its own entry so the assembler can reject it as a
/// duplicate instead of one entry silently replacing the other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionParts(Vec<(String, PartEntry)>);

impl DefinitionParts {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PartEntry)> {
        self.0.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(path, _)| path.as_str())
    }

    /// First entry declared for `path`.
    pub fn get(&self, path: &str) -> Option<&PartEntry> {
        self.iter()
            .find(|(candidate, _)| *candidate == path)
            .map(|(_, entry)| entry)
    }
}

impl Serialize for DefinitionParts {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (path, entry) in &self.0 {
            map.serialize_entry(path, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DefinitionParts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PartsVisitor)
    }
}

struct PartsVisitor;

impl<'de> Visitor<'de> for PartsVisitor {
    type Value = DefinitionParts;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of definition part paths to part entries")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut parts = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((path, entry)) = access.next_entry::<String, PartEntry>()? {
            parts.push((path, entry));
        }
        Ok(DefinitionParts(parts))
    }
}

/// Item definition manifest: item type, optional format and the configured parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionManifest {
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub definition: DefinitionParts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManifestSyntax {
    Toml,
    Yaml,
    Json,
}

impl ManifestSyntax {
    fn for_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => ManifestSyntax::Yaml,
            Some("json") => ManifestSyntax::Json,
            _ => ManifestSyntax::Toml,
        }
    }
}

impl DefinitionManifest {
    /// Load a manifest; the syntax follows the file extension (TOML by default).
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read manifest {}: {}", path.display(), e),
            )
        })?;
        Self::parse(&content, ManifestSyntax::for_path(path))
            .map_err(|e| e.with_context(path.display().to_string()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, AppError> {
        Self::parse(content, ManifestSyntax::Toml)
    }

    fn parse(content: &str, syntax: ManifestSyntax) -> Result<Self, AppError> {
        let parsed: Result<Self, Box<dyn std::error::Error + Send + Sync>> = match syntax {
            ManifestSyntax::Toml => toml::from_str(content).map_err(Into::into),
            ManifestSyntax::Yaml => serde_yaml::from_str(content).map_err(Into::into),
            ManifestSyntax::Json => serde_json::from_str(content).map_err(Into::into),
        };
        parsed.map_err(|source| {
            AppError::with_source(
                ErrorCategory::ManifestError,
                format!("Failed to parse {:?} manifest", syntax),
                source,
            )
            .with_code("DEF-MAN-001")
        })
    }

    /// `(path, config)` pairs for configuration-only validation.
    pub fn part_configs(&self) -> Vec<(String, PartConfig)> {
        self.definition
            .iter()
            .map(|(path, entry)| (path.to_string(), entry.config.clone()))
            .collect()
    }

    /// Read every part's source, relative paths resolved against `base_dir`.
    ///
    /// I/O failures are returned unchanged; nothing is retried.
    pub async fn resolve_sources(&self, base_dir: &Path) -> Result<Vec<PartInput>, AppError> {
        let mut inputs = Vec::with_capacity(self.definition.len());
        for (path, entry) in self.definition.iter() {
            let source = match &entry.source {
                SourceLocator::File(file) => {
                    let resolved = if file.is_absolute() {
                        file.clone()
                    } else {
                        base_dir.join(file)
                    };
                    debug!(part = %path, source = %resolved.display(), "reading definition source");
                    tokio::fs::read(&resolved).await.map_err(|e| {
                        let mut error = AppError::from(e);
                        error.add_context("part", path);
                        error.add_context("source", &resolved.display().to_string());
                        error
                    })?
                }
                SourceLocator::Inline(document) => serde_json::to_vec(document).map_err(|e| {
                    AppError::new(
                        ErrorCategory::SerializationError,
                        format!("Failed to serialize inline source of '{}': {}", path, e),
                    )
                })?,
            };
            inputs.push(PartInput::new(path, entry.config.clone(), source));
        }
        Ok(inputs)
    }
}
