//! Attribute-combination checks run before any source is read or transformed.

use crate::core::diagnostics::Diagnostics;
use itemdef_types::{
    DefinitionPart, ParameterRule, PartConfig, PartProcessing, ProcessingMode, TokensDelimiter,
};

pub mod rules;
pub use rules::*;

/// Inputs shared by every rule.
pub struct RuleContext<'a> {
    pub path: &'a str,
    pub config: &'a PartConfig,
    /// Mode after default resolution; `None` when `processing_mode` is not recognised.
    pub mode: Option<ProcessingMode>,
}

impl<'a> RuleContext<'a> {
    pub fn new(path: &'a str, config: &'a PartConfig) -> Self {
        Self {
            path,
            config,
            mode: config.resolved_mode(),
        }
    }
}

/// A single independent configuration check.
pub trait PartRule: Send + Sync {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics;
}

/// Registry that runs all built-in part rules and accumulates their diagnostics.
pub struct PartValidator {
    rules: Vec<Box<dyn PartRule>>,
}

impl PartValidator {
    pub fn new() -> Self {
        Self {
            rules: built_in_rules(),
        }
    }

    /// Run every rule; sorted by `(severity desc, code asc, attribute asc)`.
    pub fn check(&self, path: &str, config: &PartConfig) -> Diagnostics {
        let ctx = RuleContext::new(path, config);
        let mut diagnostics = Diagnostics::new();
        for rule in &self.rules {
            diagnostics.append(rule.check(&ctx));
        }
        diagnostics.sort();
        diagnostics
    }

    /// Validate and normalize one part's configuration.
    pub fn validate(&self, path: &str, config: &PartConfig) -> Result<DefinitionPart, Diagnostics> {
        let diagnostics = self.check(path, config);
        if diagnostics.has_errors() {
            return Err(diagnostics);
        }
        normalize(path, config).ok_or(diagnostics)
    }
}

impl Default for PartValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the normalized part; only meaningful once every rule has passed.
fn normalize(path: &str, config: &PartConfig) -> Option<DefinitionPart> {
    let processing = match config.resolved_mode()? {
        ProcessingMode::None => PartProcessing::None,
        ProcessingMode::GoTemplate => {
            let delimiter = match &config.tokens_delimiter {
                Some(raw) => TokensDelimiter::parse(raw).ok()?,
                None => TokensDelimiter::default(),
            };
            PartProcessing::GoTemplate {
                tokens: config.tokens.clone().unwrap_or_default(),
                delimiter,
            }
        }
        ProcessingMode::Parameters => {
            let rules = config
                .parameters
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|raw| {
                    raw.kind
                        .parse()
                        .ok()
                        .map(|kind| ParameterRule::new(kind, raw.find.clone(), raw.value.clone()))
                })
                .collect::<Option<Vec<_>>>()?;
            PartProcessing::Parameters { rules }
        }
    };
    Some(DefinitionPart::new(path, processing))
}

/// Convenience wrapper over a default [`PartValidator`].
pub fn validate_part(path: &str, config: &PartConfig) -> Result<DefinitionPart, Diagnostics> {
    PartValidator::new().validate(path, config)
}
