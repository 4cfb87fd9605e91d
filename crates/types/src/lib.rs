//! Shared data model for item definitions and their processing configuration.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Token name to replacement value.
pub type TokenMap = BTreeMap<String, String>;

/// Strategy applied to a definition part before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProcessingMode {
    #[default]
    None,
    GoTemplate,
    Parameters,
}

impl ProcessingMode {
    /// Attribute values accepted for `processing_mode`.
    pub const VALUES: [&'static str; 3] = ["None", "GoTemplate", "Parameters"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::None => "None",
            ProcessingMode::GoTemplate => "GoTemplate",
            ProcessingMode::Parameters => "Parameters",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "None" => Ok(ProcessingMode::None),
            "GoTemplate" => Ok(ProcessingMode::GoTemplate),
            "Parameters" => Ok(ProcessingMode::Parameters),
            other => Err(format!(
                "value must be one of: {}, got: \"{}\"",
                quoted_list(&Self::VALUES),
                other
            )),
        }
    }
}

/// Kind of replacement performed by a parameter rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    TextReplace,
    JsonPathReplace,
}

impl ParameterKind {
    /// Attribute values accepted for `parameters[*].type`.
    pub const VALUES: [&'static str; 2] = ["TextReplace", "JsonPathReplace"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::TextReplace => "TextReplace",
            ParameterKind::JsonPathReplace => "JsonPathReplace",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "TextReplace" => Ok(ParameterKind::TextReplace),
            "JsonPathReplace" => Ok(ParameterKind::JsonPathReplace),
            other => Err(format!(
                "value must be one of: {}, got: \"{}\"",
                quoted_list(&Self::VALUES),
                other
            )),
        }
    }
}

/// One ordered replacement instruction applied in `Parameters` mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRule {
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub find: String,
    pub value: String,
}

impl ParameterRule {
    pub fn new(kind: ParameterKind, find: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            find: find.into(),
            value: value.into(),
        }
    }

    pub fn text(find: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ParameterKind::TextReplace, find, value)
    }

    pub fn json_path(find: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ParameterKind::JsonPathReplace, find, value)
    }
}

/// Pair of markers that open and close a token reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokensDelimiter {
    open: String,
    close: String,
}

impl TokensDelimiter {
    /// Attribute values accepted for `tokens_delimiter`.
    pub const SUPPORTED: [&'static str; 4] = ["{{}}", "<<>>", "@{}@", "____"];

    /// Build a delimiter from explicit markers. Both markers must be non-empty.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self, String> {
        let open = open.into();
        let close = close.into();
        if open.is_empty() || close.is_empty() {
            return Err("delimiter markers must not be empty".to_string());
        }
        Ok(Self { open, close })
    }

    /// Parse the attribute form, e.g. `"<<>>"` into `("<<", ">>")`.
    pub fn parse(value: &str) -> Result<Self, String> {
        if !Self::SUPPORTED.contains(&value) {
            return Err(format!(
                "value must be one of: {}, got: \"{}\"",
                quoted_list(&Self::SUPPORTED),
                value
            ));
        }
        let (open, close) = value.split_at(value.len() / 2);
        Self::new(open, close)
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

impl Default for TokensDelimiter {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

impl fmt::Display for TokensDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.open, self.close)
    }
}

/// Normalized processing strategy of a definition part.
///
/// Token settings and parameter rules live in different variants, so a part can
/// never carry both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PartProcessing {
    #[default]
    None,
    GoTemplate {
        tokens: TokenMap,
        delimiter: TokensDelimiter,
    },
    Parameters {
        rules: Vec<ParameterRule>,
    },
}

impl PartProcessing {
    pub fn mode(&self) -> ProcessingMode {
        match self {
            PartProcessing::None => ProcessingMode::None,
            PartProcessing::GoTemplate { .. } => ProcessingMode::GoTemplate,
            PartProcessing::Parameters { .. } => ProcessingMode::Parameters,
        }
    }
}

/// A validated definition part ready for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionPart {
    pub path: String,
    pub processing: PartProcessing,
}

impl DefinitionPart {
    pub fn new(path: impl Into<String>, processing: PartProcessing) -> Self {
        Self {
            path: path.into(),
            processing,
        }
    }

    pub fn mode(&self) -> ProcessingMode {
        self.processing.mode()
    }
}

/// Raw parameter entry as configured, before its `type` is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParameter {
    #[serde(rename = "type")]
    pub kind: String,
    pub find: String,
    pub value: String,
}

impl RawParameter {
    pub fn new(kind: impl Into<String>, find: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            find: find.into(),
            value: value.into(),
        }
    }
}

/// Raw attribute snapshot of one definition part.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RawParameter>>,
}

impl PartConfig {
    pub fn has_tokens(&self) -> bool {
        self.tokens.as_ref().is_some_and(|tokens| !tokens.is_empty())
    }

    pub fn has_parameters(&self) -> bool {
        self.parameters.is_some()
    }

    /// Mode after applying the default: `GoTemplate` when tokens are present, else `None`.
    ///
    /// Returns `None` when an explicit value is not a recognised mode.
    pub fn resolved_mode(&self) -> Option<ProcessingMode> {
        match &self.processing_mode {
            Some(raw) => raw.parse().ok(),
            None if self.has_tokens() => Some(ProcessingMode::GoTemplate),
            None => Some(ProcessingMode::None),
        }
    }
}

/// Allowed definition part paths for one item type and format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionFormat {
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub paths: IndexSet<String>,
}

impl DefinitionFormat {
    pub fn new<I, S>(item_type: impl Into<String>, format: Option<&str>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            item_type: item_type.into(),
            format: format.map(str::to_string),
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Format identifier or `Default` when the API takes none.
    pub fn format_label(&self) -> &str {
        self.format.as_deref().unwrap_or("Default")
    }
}

/// Render `["a" "b"]` the way attribute diagnostics list allowed values.
pub fn quoted_list(values: &[&str]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("\"{}\"", v)).collect();
    format!("[{}]", quoted.join(" "))
}
