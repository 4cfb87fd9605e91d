use crate::core::pipeline::assembler::AssembledDefinition;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

pub const INLINE_BASE64: &str = "InlineBase64";

/// Request body of the item-definition API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub parts: Vec<PayloadPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadPart {
    pub path: String,
    pub payload: String,
    pub payload_type: String,
}

impl DefinitionPayload {
    pub fn from_definition(definition: &AssembledDefinition) -> Self {
        let parts = definition
            .parts
            .iter()
            .map(|(path, part)| PayloadPart {
                path: path.clone(),
                payload: STANDARD.encode(&part.content),
                payload_type: INLINE_BASE64.to_string(),
            })
            .collect();
        Self {
            format: definition.format.clone(),
            parts,
        }
    }

    /// Decode every part back to bytes, keyed by path.
    pub fn decode(&self) -> Result<Vec<(String, Vec<u8>)>, base64::DecodeError> {
        self.parts
            .iter()
            .map(|part| Ok((part.path.clone(), STANDARD.decode(&part.payload)?)))
            .collect()
    }
}
