use itemdef::core::definition::FormatRegistry;
use itemdef::core::pipeline::{assemble, validate_definition, DefinitionPayload, PartInput};
use itemdef_types::{DefinitionFormat, PartConfig, RawParameter, TokenMap};
use serde_json::Value;

fn eventstream() -> DefinitionFormat {
    FormatRegistry::default()
        .lookup("Eventstream", None)
        .unwrap()
        .clone()
}

fn template(pairs: &[(&str, &str)]) -> PartConfig {
    PartConfig {
        tokens: Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<TokenMap>(),
        ),
        ..Default::default()
    }
}

fn parameters(kind: &str, find: &str, value: &str) -> PartConfig {
    PartConfig {
        processing_mode: Some("Parameters".to_string()),
        parameters: Some(vec![RawParameter::new(kind, find, value)]),
        ..Default::default()
    }
}

#[test]
fn test_none_mode_is_idempotent() {
    let samples: [&[u8]; 4] = [b"", b"{{NotAToken}}", &[0, 159, 146, 150], b"{\"a\": 1}\n"];
    for sample in samples {
        let definition = assemble(
            &[PartInput::new("eventstream.json", PartConfig::default(), sample)],
            &eventstream(),
        )
        .unwrap();
        assert_eq!(definition.parts["eventstream.json"].content, sample);
    }
}

#[test]
fn test_assembly_is_deterministic() {
    let inputs = vec![
        PartInput::new(
            "eventstream.json",
            template(&[("WorkspaceID", "abc-123")]),
            b"{\"workspace\": \"{{WorkspaceID}}\"}".to_vec(),
        ),
        PartInput::new(
            "eventstreamProperties.json",
            parameters("JsonPathReplace", "$.retentionTimeInDays", "7"),
            b"{\"retentionTimeInDays\":1}".to_vec(),
        ),
    ];

    let first = assemble(&inputs, &eventstream()).unwrap();
    let second = assemble(&inputs, &eventstream()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.parts["eventstream.json"].content,
        b"{\"workspace\": \"abc-123\"}"
    );
    assert_eq!(
        first.parts["eventstreamProperties.json"].content,
        b"{\"retentionTimeInDays\":7}"
    );
    let order: Vec<&str> = first.contents().keys().copied().collect();
    assert_eq!(order, vec!["eventstream.json", "eventstreamProperties.json"]);
}

#[test]
fn test_all_problems_are_reported_together() {
    let inputs = vec![
        PartInput::new("unknown.json", PartConfig::default(), b"{}".to_vec()),
        PartInput::new(
            "eventstream.json",
            template(&[("A", "1")]),
            b"{{A}} {{B}}".to_vec(),
        ),
        PartInput::new(
            "eventstreamProperties.json",
            parameters("JsonPathReplace", "$.a", "1"),
            b"not json".to_vec(),
        ),
    ];

    let err = assemble(&inputs, &eventstream()).unwrap_err();
    let mut codes = err.codes();
    codes.sort();
    assert_eq!(codes, vec!["DEF-ASM-001", "DEF-PRM-001", "DEF-TPL-001"]);
    insta::assert_snapshot!(&err.iter().next().unwrap().detail, @r#"An argument named "unknown.json" is not expected here. Allowed paths for Eventstream (Default): ["eventstream.json" "eventstreamProperties.json"]"#);
}

#[test]
fn test_duplicate_paths_are_rejected() {
    let inputs = vec![
        PartInput::new("eventstream.json", PartConfig::default(), b"{}".to_vec()),
        PartInput::new("eventstream.json", PartConfig::default(), b"{}".to_vec()),
    ];
    let err = assemble(&inputs, &eventstream()).unwrap_err();
    assert_eq!(err.codes(), vec!["DEF-ASM-002"]);
}

#[test]
fn test_unused_tokens_are_warnings() {
    let definition = assemble(
        &[PartInput::new(
            "eventstream.json",
            template(&[("Used", "u"), ("Spare", "s")]),
            b"{{Used}}".to_vec(),
        )],
        &eventstream(),
    )
    .unwrap();
    assert_eq!(definition.warnings.codes(), vec!["DEF-TPL-003"]);
    assert!(!definition.warnings.has_errors());
}

#[test]
fn test_empty_definition_is_accepted() {
    let definition = assemble(&[], &eventstream()).unwrap();
    assert!(definition.parts.is_empty());
}

#[test]
fn test_validate_definition_without_sources() {
    let mut conflicting = parameters("TextReplace", "x", "y");
    conflicting.tokens = Some(TokenMap::from([("A".to_string(), "1".to_string())]));
    let parts = vec![
        ("eventstream.json".to_string(), PartConfig::default()),
        ("eventstreamProperties.json".to_string(), conflicting),
    ];
    let diagnostics = validate_definition(&parts, &eventstream());
    assert_eq!(diagnostics.codes(), vec!["DEF-CFG-004", "DEF-CFG-005"]);
}

#[test]
fn test_payload_carries_sha_and_base64_parts() {
    let definition = assemble(
        &[PartInput::new(
            "eventstream.json",
            PartConfig::default(),
            b"abc".to_vec(),
        )],
        &eventstream(),
    )
    .unwrap();
    assert_eq!(
        definition.parts["eventstream.json"].sha256,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );

    let payload = DefinitionPayload::from_definition(&definition);
    let json: Value = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["parts"][0]["path"], "eventstream.json");
    assert_eq!(json["parts"][0]["payload"], "YWJj");
    assert_eq!(json["parts"][0]["payloadType"], "InlineBase64");
    assert!(json.get("format").is_none());
}
