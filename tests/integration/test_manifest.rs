use itemdef::core::definition::{DefinitionManifest, FormatRegistry, SourceLocator};
use itemdef::core::pipeline::{assemble, validate_definition};
use itemdef::core::types::ErrorCategory;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_yaml_manifest_matches_toml() {
    let temp_dir = TempDir::new().unwrap();
    let yaml_path = temp_dir.path().join("def.yaml");
    fs::write(
        &yaml_path,
        r#"
item_type: SemanticModel
format: TMSL
definition:
  model.bim:
    source: model.bim
    processing_mode: Parameters
    parameters:
      - type: JsonPathReplace
        find: $.compatibilityLevel
        value: "1604"
"#,
    )
    .unwrap();

    let toml_path = temp_dir.path().join("def.toml");
    fs::write(
        &toml_path,
        r#"
item_type = "SemanticModel"
format = "TMSL"

[definition."model.bim"]
source = "model.bim"
processing_mode = "Parameters"
parameters = [{ type = "JsonPathReplace", find = "$.compatibilityLevel", value = "1604" }]
"#,
    )
    .unwrap();

    let from_yaml = DefinitionManifest::load(&yaml_path).unwrap();
    let from_toml = DefinitionManifest::load(&toml_path).unwrap();
    assert_eq!(from_yaml, from_toml);
    assert_eq!(from_yaml.format.as_deref(), Some("TMSL"));
}

#[test]
fn test_json_manifest_with_inline_source() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("def.json");
    fs::write(
        &path,
        r#"{
  "item_type": "KQLDatabase",
  "definition": {
    "DatabaseProperties.json": {
      "source": { "databaseType": "ReadWrite" }
    }
  }
}"#,
    )
    .unwrap();

    let manifest = DefinitionManifest::load(&path).unwrap();
    assert!(matches!(
        manifest
            .definition
            .get("DatabaseProperties.json")
            .unwrap()
            .source,
        SourceLocator::Inline(_)
    ));
}

#[test]
fn test_json_manifest_repeated_part_is_reported_as_duplicate() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("def.json");
    fs::write(
        &path,
        r#"{
  "item_type": "Eventstream",
  "definition": {
    "eventstream.json": { "source": "first.json" },
    "eventstream.json": { "source": "second.json", "processing_mode": "Bogus" }
  }
}"#,
    )
    .unwrap();

    let manifest = DefinitionManifest::load(&path).unwrap();
    assert_eq!(manifest.definition.len(), 2);

    let registry = FormatRegistry::default();
    let format = registry.lookup(&manifest.item_type, None).unwrap();
    let diagnostics = validate_definition(&manifest.part_configs(), format);
    let mut codes = diagnostics.codes();
    codes.sort();
    assert_eq!(codes, vec!["DEF-ASM-002", "DEF-CFG-001"]);
}

#[test]
fn test_unparseable_manifest_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "item_type = [").unwrap();

    let err = DefinitionManifest::load(&path).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ManifestError);
    assert_eq!(err.code, "DEF-MAN-001");
    assert!(err.to_string().contains("broken.toml"));
}

#[tokio::test]
async fn test_resolve_sources_and_render() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    fs::write(
        temp_dir.path().join("src").join("schema.kql"),
        ".create table {{Table}} (Id: int)\n",
    )
    .unwrap();

    let manifest = DefinitionManifest::from_toml_str(
        r#"
item_type = "KQLDatabase"

[definition."DatabaseSchema.kql"]
source = "src/schema.kql"
tokens = { Table = "Events" }

[definition."DatabaseProperties.json"]
source = { databaseType = "ReadWrite" }
"#,
    )
    .unwrap();

    let inputs = manifest.resolve_sources(temp_dir.path()).await.unwrap();
    assert_eq!(inputs.len(), 2);

    let registry = FormatRegistry::default();
    let format = registry.lookup(&manifest.item_type, None).unwrap();
    let definition = assemble(&inputs, format).unwrap();
    assert_eq!(
        definition.parts["DatabaseSchema.kql"].content,
        b".create table Events (Id: int)\n"
    );
    assert_eq!(
        definition.parts["DatabaseProperties.json"].content,
        br#"{"databaseType":"ReadWrite"}"#
    );
}

#[tokio::test]
async fn test_missing_source_carries_part_context() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = DefinitionManifest::from_toml_str(
        r#"
item_type = "Reflex"

[definition."ReflexEntities.json"]
source = "missing.json"
"#,
    )
    .unwrap();

    let err = manifest.resolve_sources(temp_dir.path()).await.unwrap_err();
    assert_eq!(err.category, ErrorCategory::IoError);
    assert_eq!(
        err.context.get("part").map(String::as_str),
        Some("ReflexEntities.json")
    );
}
