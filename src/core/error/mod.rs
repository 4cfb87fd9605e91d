use crate::core::types::{ErrorCategory, ErrorSeverity};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub code: String,
    pub message: String,
    pub context: HashMap<String, String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        let severity = match category {
            ErrorCategory::ValidationError
            | ErrorCategory::TransformError
            | ErrorCategory::ConfigError
            | ErrorCategory::ManifestError
            | ErrorCategory::SerializationError
            | ErrorCategory::IoError
            | ErrorCategory::InternalError => ErrorSeverity::Error,
            ErrorCategory::Unknown => ErrorSeverity::Info,
        };
        AppError {
            category,
            severity,
            code: format!("ERR-{}", uuid::Uuid::new_v4()),
            message: message.into(),
            context: HashMap::new(),
            occurred_at: Utc::now(),
            source: None,
        }
    }

    pub fn with_source<T: Into<String>>(
        category: ErrorCategory,
        message: T,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        let mut error = AppError::new(category, message);
        error.source = Some(anyhow::anyhow!(source));
        error
    }

    pub fn with_context<T: Into<String>>(mut self, context: T) -> Self {
        self.context.insert("context".to_string(), context.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            let mut pairs: Vec<_> = self.context.iter().collect();
            pairs.sort();
            write!(f, " (Context: {:?})", pairs)?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError {
            category: ErrorCategory::InternalError,
            severity: ErrorSeverity::Error,
            code: "ANYHOW_ERROR".to_string(),
            message: e.to_string(),
            context: HashMap::new(),
            occurred_at: Utc::now(),
            source: Some(e),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError {
            category: ErrorCategory::IoError,
            severity: ErrorSeverity::Error,
            code: "IO_ERROR".to_string(),
            message: e.to_string(),
            context: HashMap::new(),
            occurred_at: Utc::now(),
            source: Some(anyhow::anyhow!(e)),
        }
    }
}

/// Failure raised while transforming the content of a single definition part.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("unresolved token(s): {}", .names.join(", "))]
    UnresolvedToken { names: Vec<String> },
    #[error("template syntax error at byte {offset}: {reason}")]
    TemplateSyntax { offset: usize, reason: String },
    #[error("content is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("invalid JSONPath expression '{expression}': {reason}")]
    InvalidJsonPath { expression: String, reason: String },
    #[error("failed to serialize JSON document: {0}")]
    Serialization(String),
}

impl TransformError {
    /// Diagnostic code reported for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::UnresolvedToken { .. } => "DEF-TPL-001",
            TransformError::TemplateSyntax { .. } => "DEF-TPL-002",
            TransformError::InvalidJson(_) => "DEF-PRM-001",
            TransformError::Serialization(_) => "DEF-PRM-002",
            TransformError::InvalidJsonPath { .. } => "DEF-PRM-003",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            TransformError::UnresolvedToken { .. } => "Unresolved Token",
            TransformError::TemplateSyntax { .. } => "Template Syntax Error",
            TransformError::InvalidJson(_) => "Invalid JSON Content",
            TransformError::Serialization(_) => "JSON Serialization Failure",
            TransformError::InvalidJsonPath { .. } => "Invalid JSONPath Expression",
        }
    }
}
