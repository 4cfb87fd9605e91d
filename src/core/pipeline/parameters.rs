use crate::core::error::TransformError;
use crate::core::pipeline::jsonpath::{value_at_mut, JsonPath, Location};
use itemdef_types::{ParameterKind, ParameterRule};
use serde_json::{Number, Value};
use tracing::debug;

/// Failure of one rule inside a chain, with its position in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parameters[{index}] ({kind} '{find}'): {source}")]
pub struct RuleError {
    pub index: usize,
    pub kind: ParameterKind,
    pub find: String,
    #[source]
    pub source: TransformError,
}

/// Apply a single rule to `content`.
pub fn apply(content: &[u8], rule: &ParameterRule) -> Result<Vec<u8>, TransformError> {
    apply_counted(content, rule).map(|(out, _)| out)
}

/// Apply `rules` strictly in declaration order; the first failure stops the chain.
pub fn apply_all(content: &[u8], rules: &[ParameterRule]) -> Result<Vec<u8>, RuleError> {
    let mut current = content.to_vec();
    for (index, rule) in rules.iter().enumerate() {
        let (next, replaced) = apply_counted(&current, rule).map_err(|source| RuleError {
            index,
            kind: rule.kind,
            find: rule.find.clone(),
            source,
        })?;
        debug!(
            index,
            kind = %rule.kind,
            find = %rule.find,
            replaced,
            "applied parameter rule"
        );
        current = next;
    }
    Ok(current)
}

fn apply_counted(content: &[u8], rule: &ParameterRule) -> Result<(Vec<u8>, usize), TransformError> {
    match rule.kind {
        ParameterKind::TextReplace => Ok(text_replace(content, &rule.find, &rule.value)),
        ParameterKind::JsonPathReplace => json_path_replace(content, &rule.find, &rule.value),
    }
}

fn text_replace(content: &[u8], find: &str, value: &str) -> (Vec<u8>, usize) {
    if find.is_empty() {
        return (content.to_vec(), 0);
    }
    literal_replace(content, find.as_bytes(), value.as_bytes())
}

/// Non-overlapping, left-to-right replacement of every occurrence of `find`.
fn literal_replace(content: &[u8], find: &[u8], value: &[u8]) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(content.len());
    let mut cursor = 0;
    let mut count = 0;
    while let Some(found) = super::render::find_bytes(&content[cursor..], find) {
        out.extend_from_slice(&content[cursor..cursor + found]);
        out.extend_from_slice(value);
        cursor += found + find.len();
        count += 1;
    }
    out.extend_from_slice(&content[cursor..]);
    (out, count)
}

fn json_path_replace(
    content: &[u8],
    find: &str,
    value: &str,
) -> Result<(Vec<u8>, usize), TransformError> {
    let path = JsonPath::parse(find)?;
    let mut document: Value = serde_json::from_slice(content)
        .map_err(|err| TransformError::InvalidJson(err.to_string()))?;

    let locations = path.locate(&document);
    if locations.is_empty() {
        debug!(expression = path.expression(), "JSONPath matched no nodes");
        return Ok((content.to_vec(), 0));
    }

    let mut replaced = 0;
    for location in outermost(&locations) {
        if let Some(node) = value_at_mut(&mut document, location) {
            *node = coerce(node, value);
            replaced += 1;
        }
    }

    let serialized = serialize_like(content, &document)?;
    Ok((serialized, replaced))
}

/// Matches that do not sit inside another match; a replaced ancestor already
/// covers its descendants.
fn outermost(locations: &[Location]) -> Vec<&Location> {
    locations
        .iter()
        .filter(|location| {
            !locations.iter().any(|other| {
                other.len() < location.len() && location.starts_with(other.as_slice())
            })
        })
        .collect()
}

/// Replacement value typed after the node it overwrites.
///
/// Numbers and booleans keep their type when `value` parses as one; everything
/// else, including ambiguous input, becomes a JSON string.
pub fn coerce(existing: &Value, value: &str) -> Value {
    match existing {
        Value::Number(_) => {
            if let Ok(int) = value.parse::<i64>() {
                Value::Number(Number::from(int))
            } else if let Ok(uint) = value.parse::<u64>() {
                Value::Number(Number::from(uint))
            } else {
                value
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(value.to_string()))
            }
        }
        Value::Bool(_) => match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(value.to_string()),
        },
        _ => Value::String(value.to_string()),
    }
}

/// Compact output for single-line sources, two-space indentation otherwise.
fn serialize_like(original: &[u8], document: &Value) -> Result<Vec<u8>, TransformError> {
    let multiline = original.contains(&b'\n');
    let mut out = if multiline && !is_single_line_json(original) {
        serde_json::to_vec_pretty(document)
    } else {
        serde_json::to_vec(document)
    }
    .map_err(|err| TransformError::Serialization(err.to_string()))?;
    if original.ends_with(b"\n") {
        out.push(b'\n');
    }
    Ok(out)
}

/// A compact document followed only by a trailing newline.
fn is_single_line_json(original: &[u8]) -> bool {
    let trimmed = original
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map(|end| &original[..=end])
        .unwrap_or_default();
    !trimmed.contains(&b'\n')
}
