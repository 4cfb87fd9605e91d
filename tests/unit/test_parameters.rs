use itemdef::core::error::TransformError;
use itemdef::core::pipeline::parameters::{apply, apply_all, coerce};
use itemdef_types::{ParameterKind, ParameterRule};
use serde_json::{json, Value};

#[test]
fn test_rule_order_is_significant() {
    let r1 = ParameterRule::text("a", "b");
    let r2 = ParameterRule::text("b", "c");
    assert_eq!(apply_all(b"a", &[r1.clone(), r2.clone()]).unwrap(), b"c");
    assert_eq!(apply_all(b"a", &[r2, r1]).unwrap(), b"b");
}

#[test]
fn test_compatibility_level_scenario() {
    let rule = ParameterRule::json_path("$.compatibilityLevel", "2.0");
    let out = apply(br#"{"compatibilityLevel":"1.0"}"#, &rule).unwrap();
    assert_eq!(out, br#"{"compatibilityLevel":"2.0"}"#);
}

#[test]
fn test_json_path_replace_keeps_number_type() {
    let rule = ParameterRule::json_path("$.settings.retries", "5");
    let out = apply(br#"{"settings":{"retries":3,"name":"x"}}"#, &rule).unwrap();
    let doc: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(doc, json!({"settings": {"retries": 5, "name": "x"}}));
}

#[test]
fn test_json_path_replace_falls_back_to_string() {
    let rule = ParameterRule::json_path("$.enabled", "maybe");
    let out = apply(br#"{"enabled":true}"#, &rule).unwrap();
    assert_eq!(out, br#"{"enabled":"maybe"}"#);
}

#[test]
fn test_coercion_in_both_directions() {
    assert_eq!(coerce(&json!(1), "42"), json!(42));
    assert_eq!(coerce(&json!(1.5), "2.25"), json!(2.25));
    assert_eq!(coerce(&json!(1), "abc"), json!("abc"));
    assert_eq!(coerce(&json!(false), "true"), json!(true));
    assert_eq!(coerce(&json!(false), "TRUE"), json!("TRUE"));
    assert_eq!(coerce(&json!("text"), "7"), json!("7"));
    assert_eq!(coerce(&Value::Null, "null"), json!("null"));
    assert_eq!(coerce(&json!({"a": 1}), "{}"), json!("{}"));
}

#[test]
fn test_wildcard_replaces_every_match() {
    let rule = ParameterRule::json_path("$.sources[*].workspaceId", "ws-2");
    let input = br#"{"sources":[{"workspaceId":"ws-1"},{"workspaceId":"ws-1"},{"other":1}]}"#;
    let out = apply(input, &rule).unwrap();
    let doc: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(
        doc,
        json!({"sources": [{"workspaceId": "ws-2"}, {"workspaceId": "ws-2"}, {"other": 1}]})
    );
}

#[test]
fn test_recursive_descent_and_filter() {
    let rule = ParameterRule::json_path("$..nodes[?(@.type == 'sink')].name", "renamed");
    let input = br#"{"graph":{"nodes":[{"type":"source","name":"a"},{"type":"sink","name":"b"}]}}"#;
    let out = apply(input, &rule).unwrap();
    let doc: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(doc["graph"]["nodes"][0]["name"], json!("a"));
    assert_eq!(doc["graph"]["nodes"][1]["name"], json!("renamed"));
}

#[test]
fn test_no_match_leaves_content_untouched() {
    let rule = ParameterRule::json_path("$.missing", "x");
    let input = b"{ \"kept\" : 1 }";
    assert_eq!(apply(input, &rule).unwrap(), input);
}

#[test]
fn test_pretty_source_stays_pretty() {
    let rule = ParameterRule::json_path("$.name", "new");
    let input = b"{\n  \"name\": \"old\",\n  \"n\": 1\n}\n";
    let out = apply(input, &rule).unwrap();
    assert_eq!(out, b"{\n  \"name\": \"new\",\n  \"n\": 1\n}\n");
}

#[test]
fn test_invalid_json_stops_the_chain() {
    let rules = [
        ParameterRule::text("x", "y"),
        ParameterRule::json_path("$.a", "1"),
        ParameterRule::text("y", "z"),
    ];
    let err = apply_all(b"not json x", &rules).unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.kind, ParameterKind::JsonPathReplace);
    assert!(matches!(err.source, TransformError::InvalidJson(_)));
}

#[test]
fn test_invalid_expression_is_reported() {
    let rule = ParameterRule::json_path("$.a[", "1");
    let err = apply(br#"{"a":[1]}"#, &rule).unwrap_err();
    assert!(matches!(err, TransformError::InvalidJsonPath { .. }));
}

#[test]
fn test_text_replace_works_on_non_json_content() {
    let rule = ParameterRule::text("DEV", "PROD");
    let out = apply(b"# notebook\nenv = 'DEV' # DEV\n", &rule).unwrap();
    assert_eq!(out, b"# notebook\nenv = 'PROD' # PROD\n");
}
