use crate::core::diagnostics::{part_attribute, Diagnostic, Diagnostics};
use crate::core::pipeline::processor::{self, ProcessedPart};
use crate::core::pipeline::validator::PartValidator;
use indexmap::IndexMap;
use itemdef_types::{DefinitionFormat, PartConfig};
use std::collections::HashMap;
use tracing::{info, warn};

/// One configured part together with its already-resolved source bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartInput {
    pub path: String,
    pub config: PartConfig,
    pub source: Vec<u8>,
}

impl PartInput {
    pub fn new(path: impl Into<String>, config: PartConfig, source: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            config,
            source: source.into(),
        }
    }
}

/// A fully processed definition, keyed by part path in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDefinition {
    pub item_type: String,
    pub format: Option<String>,
    pub parts: IndexMap<String, ProcessedPart>,
    pub warnings: Diagnostics,
}

impl AssembledDefinition {
    /// `path -> content` view handed to the upload step.
    pub fn contents(&self) -> IndexMap<&str, &[u8]> {
        self.parts
            .iter()
            .map(|(path, part)| (path.as_str(), part.content.as_slice()))
            .collect()
    }
}

/// Validates, transforms and collects every part of one item definition.
pub struct Assembler {
    validator: PartValidator,
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            validator: PartValidator::new(),
        }
    }

    /// Pre-transformation checks only: path membership, duplicates and attributes.
    pub fn check<'a, I>(&self, parts: I, format: &DefinitionFormat) -> Diagnostics
    where
        I: IntoIterator<Item = (&'a str, &'a PartConfig)>,
    {
        let parts: Vec<(&str, &PartConfig)> = parts.into_iter().collect();
        let mut diagnostics = path_diagnostics(parts.iter().map(|(path, _)| *path), format);
        for (path, config) in &parts {
            diagnostics.append(self.validator.check(path, config));
        }
        diagnostics
    }

    /// Run the whole pipeline; any error means no definition is produced.
    pub fn assemble(
        &self,
        inputs: &[PartInput],
        format: &DefinitionFormat,
    ) -> Result<AssembledDefinition, Diagnostics> {
        let mut diagnostics =
            path_diagnostics(inputs.iter().map(|input| input.path.as_str()), format);
        let mut parts = IndexMap::with_capacity(inputs.len());

        for input in inputs {
            let part = match self.validator.validate(&input.path, &input.config) {
                Ok(part) => part,
                Err(errors) => {
                    diagnostics.append(errors);
                    continue;
                }
            };
            match processor::process(&part, &input.source) {
                Ok(processed) => {
                    diagnostics.extend(processed.warnings.iter().cloned());
                    parts.entry(input.path.clone()).or_insert(processed);
                }
                Err(errors) => diagnostics.append(errors),
            }
        }

        if diagnostics.has_errors() {
            warn!(
                item_type = %format.item_type,
                errors = diagnostics.error_count(),
                "definition rejected"
            );
            return Err(diagnostics);
        }

        info!(
            item_type = %format.item_type,
            format = format.format_label(),
            parts = parts.len(),
            "definition assembled"
        );
        Ok(AssembledDefinition {
            item_type: format.item_type.clone(),
            format: format.format.clone(),
            parts,
            warnings: diagnostics,
        })
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble with the built-in validator.
pub fn assemble(
    inputs: &[PartInput],
    format: &DefinitionFormat,
) -> Result<AssembledDefinition, Diagnostics> {
    Assembler::new().assemble(inputs, format)
}

/// Check configurations without reading or transforming any source.
pub fn validate_definition(parts: &[(String, PartConfig)], format: &DefinitionFormat) -> Diagnostics {
    Assembler::new().check(parts.iter().map(|(path, config)| (path.as_str(), config)), format)
}

fn path_diagnostics<'a>(
    paths: impl Iterator<Item = &'a str>,
    format: &DefinitionFormat,
) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for path in paths {
        let count = seen.entry(path).or_insert(0);
        *count += 1;
        if *count == 2 {
            diagnostics.push(
                Diagnostic::error(
                    "DEF-ASM-002",
                    "Duplicate Definition Part",
                    format!("definition part \"{}\" is configured more than once", path),
                )
                .at(part_attribute(path)),
            );
        }
        if *count == 1 && !format.allows(path) {
            let allowed: Vec<&str> = format.paths.iter().map(String::as_str).collect();
            diagnostics.push(
                Diagnostic::error(
                    "DEF-ASM-001",
                    "Unsupported argument",
                    format!(
                        "An argument named \"{}\" is not expected here. Allowed paths for {} ({}): {}",
                        path,
                        format.item_type,
                        format.format_label(),
                        itemdef_types::quoted_list(&allowed)
                    ),
                )
                .at(part_attribute(path)),
            );
        }
    }
    diagnostics
}
