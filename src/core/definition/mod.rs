//! Definition formats and manifests: the caller side of the pipeline.

pub mod format;
pub mod manifest;

pub use format::{built_in_formats, FormatRegistry};
pub use itemdef_types::{
    DefinitionFormat, DefinitionPart, ParameterKind, ParameterRule, PartConfig, PartProcessing,
    ProcessingMode, RawParameter, TokenMap, TokensDelimiter,
};
pub use manifest::{DefinitionManifest, DefinitionParts, PartEntry, SourceLocator};
