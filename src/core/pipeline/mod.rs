//! Definition content transformation pipeline.
//!
//! Validator -> processor (renderer or parameter chain) -> assembler. Every stage is a
//! pure function over in-memory buffers; source I/O belongs to the caller.

pub mod assembler;
pub mod jsonpath;
pub mod parameters;
pub mod payload;
pub mod processor;
pub mod render;
pub mod validator;

pub use assembler::{assemble, validate_definition, AssembledDefinition, Assembler, PartInput};
pub use payload::DefinitionPayload;
pub use processor::{process, ProcessedPart};
pub use validator::{validate_part, PartValidator};
