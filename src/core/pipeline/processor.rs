use crate::core::diagnostics::{part_attribute, Diagnostic, Diagnostics};
use crate::core::pipeline::{parameters, render};
use crate::utils::compute_sha256_hex;
use itemdef_types::{DefinitionPart, PartProcessing};
use tracing::debug;

/// Final content of one definition part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedPart {
    pub path: String,
    pub content: Vec<u8>,
    /// Lowercase hex SHA-256 of `content`.
    pub sha256: String,
    pub warnings: Diagnostics,
}

/// Transform `raw` according to the part's processing strategy.
pub fn process(part: &DefinitionPart, raw: &[u8]) -> Result<ProcessedPart, Diagnostics> {
    let mut warnings = Diagnostics::new();
    let content = match &part.processing {
        PartProcessing::None => raw.to_vec(),
        PartProcessing::GoTemplate { tokens, delimiter } => {
            let rendered = render::render_tracked(raw, tokens, delimiter)
                .map_err(|err| Diagnostics::from(vec![Diagnostic::from_transform(&part.path, &err)]))?;
            for name in tokens.keys().filter(|name| !rendered.referenced.contains(*name)) {
                warnings.push(
                    Diagnostic::warning(
                        "DEF-TPL-003",
                        "Unused Token",
                        format!(
                            "token \"{}\" is not referenced by definition part \"{}\"",
                            name, part.path
                        ),
                    )
                    .at(format!("{}.tokens", part_attribute(&part.path))),
                );
            }
            rendered.content
        }
        PartProcessing::Parameters { rules } => parameters::apply_all(raw, rules).map_err(|err| {
            let mut diagnostic = Diagnostic::from_transform(&part.path, &err.source);
            diagnostic.detail = format!("definition part \"{}\": {}", part.path, err);
            diagnostic.attribute = Some(format!(
                "{}.parameters[{}]",
                part_attribute(&part.path),
                err.index
            ));
            Diagnostics::from(vec![diagnostic])
        })?,
    };

    debug!(
        path = %part.path,
        mode = %part.mode(),
        input_bytes = raw.len(),
        output_bytes = content.len(),
        "processed definition part"
    );

    Ok(ProcessedPart {
        path: part.path.clone(),
        sha256: compute_sha256_hex(&content),
        content,
        warnings,
    })
}
