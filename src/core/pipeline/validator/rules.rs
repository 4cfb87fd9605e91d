use super::{PartRule, RuleContext};
use crate::core::diagnostics::{field_attribute, Diagnostic, Diagnostics};
use crate::core::pipeline::jsonpath::JsonPath;
use itemdef_types::{quoted_list, ParameterKind, ProcessingMode, TokensDelimiter};

const INVALID_VALUE: &str = "Invalid Attribute Value";
const INVALID_COMBINATION: &str = "Invalid Attribute Combination";

pub fn built_in_rules() -> Vec<Box<dyn PartRule>> {
    vec![
        Box::new(ProcessingModeValueRule),
        Box::new(DelimiterWithoutTokensRule),
        Box::new(DelimiterValueRule),
        Box::new(ParametersModeConflictRule),
        Box::new(TokensOutsideTemplateRule),
        Box::new(ParametersOutsideModeRule),
        Box::new(ParameterTypeRule),
        Box::new(ParametersRequiredRule),
        Box::new(ParameterFindRule),
        Box::new(JsonPathSyntaxRule),
    ]
}

fn one(diagnostic: Diagnostic) -> Diagnostics {
    Diagnostics::from(vec![diagnostic])
}

struct ProcessingModeValueRule;

impl PartRule for ProcessingModeValueRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        match (&ctx.config.processing_mode, ctx.mode) {
            (Some(raw), None) => one(
                Diagnostic::error(
                    "DEF-CFG-001",
                    INVALID_VALUE,
                    format!(
                        "Attribute processing_mode value must be one of: {}, got: \"{}\"",
                        quoted_list(&ProcessingMode::VALUES),
                        raw
                    ),
                )
                .at(field_attribute(ctx.path, "processing_mode")),
            ),
            _ => Diagnostics::new(),
        }
    }
}

struct DelimiterWithoutTokensRule;

impl PartRule for DelimiterWithoutTokensRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        if ctx.config.tokens_delimiter.is_some() && !ctx.config.has_tokens() {
            return one(
                Diagnostic::error(
                    "DEF-CFG-002",
                    INVALID_COMBINATION,
                    "Attribute tokens_delimiter requires tokens to be configured",
                )
                .at(field_attribute(ctx.path, "tokens_delimiter")),
            );
        }
        Diagnostics::new()
    }
}

struct DelimiterValueRule;

impl PartRule for DelimiterValueRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        match &ctx.config.tokens_delimiter {
            Some(raw) => match TokensDelimiter::parse(raw) {
                Ok(_) => Diagnostics::new(),
                Err(reason) => one(
                    Diagnostic::error(
                        "DEF-CFG-003",
                        INVALID_VALUE,
                        format!("Attribute tokens_delimiter {}", reason),
                    )
                    .at(field_attribute(ctx.path, "tokens_delimiter")),
                ),
            },
            None => Diagnostics::new(),
        }
    }
}

struct ParametersModeConflictRule;

impl PartRule for ParametersModeConflictRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        if ctx.mode != Some(ProcessingMode::Parameters) {
            return Diagnostics::new();
        }
        let mut out = Diagnostics::new();
        for (field, configured) in [
            ("tokens", ctx.config.tokens.is_some()),
            ("tokens_delimiter", ctx.config.tokens_delimiter.is_some()),
        ] {
            if configured {
                out.push(
                    Diagnostic::error(
                        "DEF-CFG-004",
                        INVALID_COMBINATION,
                        format!(
                            "Attribute {} cannot be configured when processing_mode is \"Parameters\"",
                            field
                        ),
                    )
                    .at(field_attribute(ctx.path, field)),
                );
            }
        }
        out
    }
}

struct TokensOutsideTemplateRule;

impl PartRule for TokensOutsideTemplateRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        match ctx.mode {
            Some(mode @ (ProcessingMode::Parameters | ProcessingMode::None))
                if ctx.config.has_tokens() =>
            {
                one(
                    Diagnostic::error(
                        "DEF-CFG-005",
                        "Invalid configuration for attribute tokens",
                        format!(
                            "Attribute tokens only applies when processing_mode is \"GoTemplate\", got: \"{}\"",
                            mode
                        ),
                    )
                    .at(field_attribute(ctx.path, "tokens")),
                )
            }
            _ => Diagnostics::new(),
        }
    }
}

struct ParametersOutsideModeRule;

impl PartRule for ParametersOutsideModeRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        match ctx.mode {
            Some(mode @ (ProcessingMode::GoTemplate | ProcessingMode::None))
                if ctx.config.has_parameters() =>
            {
                one(
                    Diagnostic::error(
                        "DEF-CFG-006",
                        "Invalid configuration for attribute parameters",
                        format!(
                            "Attribute parameters only applies when processing_mode is \"Parameters\", got: \"{}\"",
                            mode
                        ),
                    )
                    .at(field_attribute(ctx.path, "parameters")),
                )
            }
            _ => Diagnostics::new(),
        }
    }
}

struct ParameterTypeRule;

impl PartRule for ParameterTypeRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        let mut out = Diagnostics::new();
        for (index, parameter) in ctx.config.parameters.iter().flatten().enumerate() {
            if parameter.kind.parse::<ParameterKind>().is_err() {
                out.push(
                    Diagnostic::error(
                        "DEF-CFG-007",
                        INVALID_VALUE,
                        format!(
                            "Attribute parameters[{}].type value must be one of: {}, got: \"{}\"",
                            index,
                            quoted_list(&ParameterKind::VALUES),
                            parameter.kind
                        ),
                    )
                    .at(field_attribute(ctx.path, &format!("parameters[{}].type", index))),
                );
            }
        }
        out
    }
}

struct ParametersRequiredRule;

impl PartRule for ParametersRequiredRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        let empty = ctx.config.parameters.as_ref().map_or(true, Vec::is_empty);
        if ctx.mode == Some(ProcessingMode::Parameters) && empty {
            return one(
                Diagnostic::error(
                    "DEF-CFG-008",
                    "Missing Attribute Configuration",
                    "Attribute parameters must contain at least one entry when processing_mode is \"Parameters\"",
                )
                .at(field_attribute(ctx.path, "parameters")),
            );
        }
        Diagnostics::new()
    }
}

struct ParameterFindRule;

impl PartRule for ParameterFindRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        let mut out = Diagnostics::new();
        for (index, parameter) in ctx.config.parameters.iter().flatten().enumerate() {
            if parameter.find.is_empty() {
                out.push(
                    Diagnostic::error(
                        "DEF-CFG-009",
                        INVALID_VALUE,
                        format!("Attribute parameters[{}].find must not be empty", index),
                    )
                    .at(field_attribute(ctx.path, &format!("parameters[{}].find", index))),
                );
            }
        }
        out
    }
}

struct JsonPathSyntaxRule;

impl PartRule for JsonPathSyntaxRule {
    fn check(&self, ctx: &RuleContext<'_>) -> Diagnostics {
        let mut out = Diagnostics::new();
        for (index, parameter) in ctx.config.parameters.iter().flatten().enumerate() {
            let is_json_path =
                parameter.kind.parse::<ParameterKind>() == Ok(ParameterKind::JsonPathReplace);
            if !is_json_path || parameter.find.is_empty() {
                continue;
            }
            if let Err(err) = JsonPath::parse(&parameter.find) {
                out.push(
                    Diagnostic::error("DEF-CFG-010", "Invalid JSONPath Expression", err.to_string())
                        .at(field_attribute(ctx.path, &format!("parameters[{}].find", index))),
                );
            }
        }
        out
    }
}
