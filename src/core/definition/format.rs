#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use indexmap::IndexSet;
use itemdef_types::DefinitionFormat;

/// Definition formats known out of the box.
pub fn built_in_formats() -> Vec<DefinitionFormat> {
    vec![
        DefinitionFormat::new(
            "Eventstream",
            None,
            ["eventstream.json", "eventstreamProperties.json"],
        ),
        DefinitionFormat::new("Notebook", Some("ipynb"), ["notebook-content.ipynb"]),
        DefinitionFormat::new("Notebook", Some("py"), ["notebook-content.py"]),
        DefinitionFormat::new("DataPipeline", None, ["pipeline-content.json"]),
        DefinitionFormat::new(
            "SparkJobDefinition",
            Some("SparkJobDefinitionV1"),
            ["SparkJobDefinitionV1.json"],
        ),
        DefinitionFormat::new(
            "KQLDatabase",
            None,
            ["DatabaseProperties.json", "DatabaseSchema.kql"],
        ),
        DefinitionFormat::new("KQLQueryset", None, ["RealTimeQueryset.json"]),
        DefinitionFormat::new("KQLDashboard", None, ["RealTimeDashboard.json"]),
        DefinitionFormat::new("Reflex", None, ["ReflexEntities.json"]),
        DefinitionFormat::new(
            "SemanticModel",
            Some("TMSL"),
            ["model.bim", "definition.pbism", "diagramLayout.json"],
        ),
    ]
}

/// Read-only lookup of definition formats, built once at startup.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: Vec<DefinitionFormat>,
}

impl FormatRegistry {
    pub fn new(formats: Vec<DefinitionFormat>) -> Self {
        Self { formats }
    }

    /// Built-in formats overlaid with `extra`; an entry with the same item type and
    /// format identifier replaces the built-in one.
    pub fn with_overrides(extra: &[DefinitionFormat]) -> Self {
        let mut formats = built_in_formats();
        for format in extra {
            match formats
                .iter_mut()
                .find(|f| same_key(f, &format.item_type, format.format.as_deref()))
            {
                Some(existing) => *existing = format.clone(),
                None => formats.push(format.clone()),
            }
        }
        Self { formats }
    }

    pub fn formats(&self) -> &[DefinitionFormat] {
        &self.formats
    }

    pub fn for_item_type<'a>(
        &'a self,
        item_type: &'a str,
    ) -> impl Iterator<Item = &'a DefinitionFormat> {
        self.formats
            .iter()
            .filter(move |f| f.item_type.eq_ignore_ascii_case(item_type))
    }

    /// Resolve the format for `item_type`.
    ///
    /// Without a format name the entry without identifier (`Default`) wins, falling
    /// back to the first declared format for the item type.
    pub fn lookup(&self, item_type: &str, format: Option<&str>) -> Result<&DefinitionFormat, AppError> {
        let candidates: Vec<&DefinitionFormat> = self
            .formats
            .iter()
            .filter(|f| f.item_type.eq_ignore_ascii_case(item_type))
            .collect();
        if candidates.is_empty() {
            let known: IndexSet<&str> = self.formats.iter().map(|f| f.item_type.as_str()).collect();
            let known: Vec<&str> = known.into_iter().collect();
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "Unknown item type '{}'; known item types: {}",
                    item_type,
                    known.join(", ")
                ),
            )
            .with_code("DEF-FMT-001"));
        }

        let found = match format {
            Some(name) if !name.eq_ignore_ascii_case("Default") => candidates
                .iter()
                .find(|f| same_key(f, item_type, Some(name)))
                .copied(),
            _ => candidates
                .iter()
                .find(|f| f.format.is_none())
                .or_else(|| candidates.first())
                .copied(),
        };

        found.ok_or_else(|| {
            let labels: Vec<&str> = candidates.iter().map(|f| f.format_label()).collect();
            AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "Item type '{}' has no definition format '{}'; available formats: {}",
                    item_type,
                    format.unwrap_or("Default"),
                    labels.join(", ")
                ),
            )
            .with_code("DEF-FMT-002")
        })
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new(built_in_formats())
    }
}

fn same_key(candidate: &DefinitionFormat, item_type: &str, format: Option<&str>) -> bool {
    let format_matches = match (candidate.format.as_deref(), format) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };
    candidate.item_type.eq_ignore_ascii_case(item_type) && format_matches
}
