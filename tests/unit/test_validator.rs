use itemdef::core::pipeline::validator::{validate_part, PartValidator};
use itemdef_types::{
    ParameterKind, ParameterRule, PartConfig, PartProcessing, RawParameter, TokenMap,
    TokensDelimiter,
};

fn tokens() -> TokenMap {
    TokenMap::from([("WorkspaceID".to_string(), "abc-123".to_string())])
}

fn text_parameter() -> Vec<RawParameter> {
    vec![RawParameter::new("TextReplace", "DEV", "PROD")]
}

#[test]
fn test_parameters_mode_with_tokens_is_rejected() {
    let config = PartConfig {
        processing_mode: Some("Parameters".to_string()),
        tokens: Some(tokens()),
        parameters: Some(text_parameter()),
        ..Default::default()
    };
    let err = validate_part("model.bim", &config).unwrap_err();
    assert_eq!(err.codes(), vec!["DEF-CFG-004", "DEF-CFG-005"]);
    assert!(err.iter().all(|d| d.is_error()));
}

#[test]
fn test_tokens_and_parameters_are_never_silently_accepted() {
    for mode in [None, Some("None"), Some("GoTemplate"), Some("Parameters")] {
        let config = PartConfig {
            processing_mode: mode.map(str::to_string),
            tokens: Some(tokens()),
            parameters: Some(text_parameter()),
            ..Default::default()
        };
        let diagnostics = PartValidator::new().check("a.json", &config);
        assert!(diagnostics.has_errors(), "mode {:?} was accepted", mode);
    }
}

#[test]
fn test_invalid_mode_lists_allowed_values() {
    let config = PartConfig {
        processing_mode: Some("gotemplate".to_string()),
        ..Default::default()
    };
    let err = validate_part("a.json", &config).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r#"
    error[DEF-CFG-001]: Invalid Attribute Value
      with definition["a.json"].processing_mode
      Attribute processing_mode value must be one of: ["None" "GoTemplate" "Parameters"], got: "gotemplate"
    "#);
}

#[test]
fn test_delimiter_requires_tokens() {
    let config = PartConfig {
        tokens_delimiter: Some("<<>>".to_string()),
        ..Default::default()
    };
    let err = validate_part("a.json", &config).unwrap_err();
    assert_eq!(err.codes(), vec!["DEF-CFG-002"]);
}

#[test]
fn test_unsupported_delimiter_value() {
    let config = PartConfig {
        tokens: Some(tokens()),
        tokens_delimiter: Some("[[]]".to_string()),
        ..Default::default()
    };
    let err = validate_part("a.json", &config).unwrap_err();
    assert_eq!(err.codes(), vec!["DEF-CFG-003"]);
}

#[test]
fn test_parameters_mode_requires_rules() {
    let config = PartConfig {
        processing_mode: Some("Parameters".to_string()),
        parameters: Some(Vec::new()),
        ..Default::default()
    };
    let err = validate_part("a.json", &config).unwrap_err();
    assert_eq!(err.codes(), vec!["DEF-CFG-008"]);
}

#[test]
fn test_every_bad_rule_is_reported() {
    let config = PartConfig {
        processing_mode: Some("Parameters".to_string()),
        parameters: Some(vec![
            RawParameter::new("RegexReplace", "a", "b"),
            RawParameter::new("TextReplace", "", "b"),
            RawParameter::new("JsonPathReplace", "$.a[", "b"),
        ]),
        ..Default::default()
    };
    let err = validate_part("a.json", &config).unwrap_err();
    assert_eq!(err.codes(), vec!["DEF-CFG-007", "DEF-CFG-009", "DEF-CFG-010"]);
    let attributes: Vec<_> = err.iter().filter_map(|d| d.attribute.as_deref()).collect();
    assert_eq!(
        attributes,
        vec![
            "definition[\"a.json\"].parameters[0].type",
            "definition[\"a.json\"].parameters[1].find",
            "definition[\"a.json\"].parameters[2].find",
        ]
    );
}

#[test]
fn test_valid_configurations_normalize() {
    let template = PartConfig {
        tokens: Some(tokens()),
        tokens_delimiter: Some("@{}@".to_string()),
        ..Default::default()
    };
    match validate_part("a.json", &template).unwrap().processing {
        PartProcessing::GoTemplate { tokens, delimiter } => {
            assert_eq!(tokens.len(), 1);
            assert_eq!(delimiter, TokensDelimiter::parse("@{}@").unwrap());
        }
        other => panic!("unexpected processing {:?}", other),
    }

    let parameters = PartConfig {
        processing_mode: Some("Parameters".to_string()),
        parameters: Some(vec![
            RawParameter::new("JsonPathReplace", "$.a", "1"),
            RawParameter::new("TextReplace", "x", "y"),
        ]),
        ..Default::default()
    };
    let part = validate_part("a.json", &parameters).unwrap();
    assert_eq!(
        part.processing,
        PartProcessing::Parameters {
            rules: vec![
                ParameterRule::new(ParameterKind::JsonPathReplace, "$.a", "1"),
                ParameterRule::text("x", "y"),
            ]
        }
    );
}

#[test]
fn test_explicit_none_with_nothing_else_passes() {
    let config = PartConfig {
        processing_mode: Some("None".to_string()),
        ..Default::default()
    };
    assert_eq!(
        validate_part("a.json", &config).unwrap().processing,
        PartProcessing::None
    );
}
