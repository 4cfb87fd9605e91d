pub mod config;
pub mod definition;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod types;

pub use config::{ConfigLoader, ConfigValidator, ItemdefConfig};
pub use definition::{DefinitionManifest, FormatRegistry};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{AppError, TransformError};
pub use pipeline::{Assembler, AssembledDefinition, DefinitionPayload, PartInput};
pub use types::*;
