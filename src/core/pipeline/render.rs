//! Token interpolation for `GoTemplate` definition parts.
//!
//! Only `open [.]identifier close` actions are understood. Everything outside an
//! action is copied byte-for-byte, so sources do not have to be valid UTF-8.

use crate::core::error::TransformError;
use itemdef_types::{TokenMap, TokensDelimiter};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Action body naming a single token, with an optional leading dot.
static TOKEN_ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\.?([A-Za-z_][A-Za-z0-9_]*)\s*$").expect("token action pattern is valid")
});

/// Output of a render pass together with the token names the template referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: Vec<u8>,
    pub referenced: BTreeSet<String>,
}

/// Render `source`, replacing every token reference with its value from `tokens`.
pub fn render(
    source: &[u8],
    tokens: &TokenMap,
    delimiter: &TokensDelimiter,
) -> Result<Vec<u8>, TransformError> {
    render_tracked(source, tokens, delimiter).map(|rendered| rendered.content)
}

/// Same as [`render`], also reporting which tokens were used.
pub fn render_tracked(
    source: &[u8],
    tokens: &TokenMap,
    delimiter: &TokensDelimiter,
) -> Result<Rendered, TransformError> {
    let open = delimiter.open().as_bytes();
    let close = delimiter.close().as_bytes();

    let mut content = Vec::with_capacity(source.len());
    let mut referenced = BTreeSet::new();
    let mut missing: Vec<String> = Vec::new();
    let mut cursor = 0;

    while let Some(found) = find_bytes(&source[cursor..], open) {
        let start = cursor + found;
        content.extend_from_slice(&source[cursor..start]);

        let body_start = start + open.len();
        let body_len = find_bytes(&source[body_start..], close).ok_or_else(|| {
            TransformError::TemplateSyntax {
                offset: start,
                reason: format!("unterminated action, missing closing '{}'", delimiter.close()),
            }
        })?;
        let body = &source[body_start..body_start + body_len];
        let name = token_name(body).ok_or_else(|| TransformError::TemplateSyntax {
            offset: start,
            reason: format!(
                "unsupported action '{}{}{}', expected a token name",
                delimiter.open(),
                String::from_utf8_lossy(body),
                delimiter.close()
            ),
        })?;

        match tokens.get(name) {
            Some(value) => content.extend_from_slice(value.as_bytes()),
            None => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
            }
        }
        referenced.insert(name.to_string());
        cursor = body_start + body_len + close.len();
    }
    content.extend_from_slice(&source[cursor..]);

    if !missing.is_empty() {
        return Err(TransformError::UnresolvedToken { names: missing });
    }
    Ok(Rendered {
        content,
        referenced,
    })
}

/// Extract the identifier from an action body such as ` .WorkspaceID `.
fn token_name(body: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(body).ok()?;
    TOKEN_ACTION_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
