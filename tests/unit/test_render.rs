use itemdef::core::error::TransformError;
use itemdef::core::pipeline::render::{render, render_tracked};
use itemdef_types::{TokenMap, TokensDelimiter};

fn tokens(pairs: &[(&str, &str)]) -> TokenMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_workspace_id_scenario() {
    let out = render(
        b"id={{WorkspaceID}}",
        &tokens(&[("WorkspaceID", "abc-123")]),
        &TokensDelimiter::default(),
    )
    .unwrap();
    assert_eq!(out, b"id=abc-123");
}

#[test]
fn test_token_completeness() {
    let available = tokens(&[("Present", "p")]);
    for name in ["Present", "Absent", "present", "_Other"] {
        let template = format!("value: {{{{{}}}}}", name);
        let result = render(template.as_bytes(), &available, &TokensDelimiter::default());
        if available.contains_key(name) {
            assert_eq!(result.unwrap(), b"value: p", "token {}", name);
        } else {
            assert_eq!(
                result.unwrap_err(),
                TransformError::UnresolvedToken {
                    names: vec![name.to_string()]
                },
                "token {}",
                name
            );
        }
    }
}

#[test]
fn test_custom_delimiters_match_default_rendering() {
    let values = tokens(&[("X", "v")]);
    let expected = render(b"a {{X}} b", &values, &TokensDelimiter::default()).unwrap();

    for raw in TokensDelimiter::SUPPORTED {
        let delimiter = TokensDelimiter::parse(raw).unwrap();
        let template = format!("a {}X{} b", delimiter.open(), delimiter.close());
        let out = render(template.as_bytes(), &values, &delimiter).unwrap();
        assert_eq!(out, expected, "delimiter {}", raw);
    }
}

#[test]
fn test_default_markers_are_literal_under_custom_delimiters() {
    let delimiter = TokensDelimiter::parse("<<>>").unwrap();
    let out = render(b"{{X}} <<X>>", &tokens(&[("X", "v")]), &delimiter).unwrap();
    assert_eq!(out, b"{{X}} v");
}

#[test]
fn test_rendering_is_deterministic() {
    let values = tokens(&[("A", "1"), ("B", "2")]);
    let template = b"{\"a\": \"{{A}}\", \"b\": \"{{ .B }}\", \"again\": \"{{A}}\"}";
    let first = render(template, &values, &TokensDelimiter::default()).unwrap();
    let second = render(template, &values, &TokensDelimiter::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, b"{\"a\": \"1\", \"b\": \"2\", \"again\": \"1\"}");
}

#[test]
fn test_tracking_reports_referenced_tokens_only() {
    let rendered = render_tracked(
        b"{{Used}}",
        &tokens(&[("Used", "u"), ("Unused", "x")]),
        &TokensDelimiter::default(),
    )
    .unwrap();
    assert!(rendered.referenced.contains("Used"));
    assert!(!rendered.referenced.contains("Unused"));
}

#[test]
fn test_template_without_actions_is_unchanged() {
    let source = b"no actions here { } }}";
    let out = render(source, &tokens(&[]), &TokensDelimiter::default()).unwrap();
    assert_eq!(out, source);
}
