use crate::{
    cli::args::{FormatsArgs, RenderArgs, ValidateArgs},
    core::{
        config::{ConfigLoader, ConfigValidator, ItemdefConfig},
        definition::{DefinitionManifest, FormatRegistry},
        diagnostics::Diagnostics,
        pipeline::{validate_definition, Assembler, DefinitionPayload},
    },
    utils::OutputWriter,
    Result,
};
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};

pub async fn render(args: RenderArgs, config_file: Option<&Path>) -> Result<()> {
    let workspace = manifest_dir(&args.manifest);
    let config = load_config(&workspace, config_file)?;
    let manifest = DefinitionManifest::load(&args.manifest)?;
    tracing::info!(
        "Rendering {} definition from {}",
        manifest.item_type,
        args.manifest.display()
    );

    let registry = FormatRegistry::with_overrides(&config.formats);
    let format = registry.lookup(&manifest.item_type, manifest.format.as_deref())?;
    let checked = validate_definition(&manifest.part_configs(), format);
    if checked.has_errors() {
        return Err(report_failure(&checked));
    }
    let inputs = manifest.resolve_sources(&workspace).await?;

    let definition = match Assembler::new().assemble(&inputs, format) {
        Ok(definition) => definition,
        Err(diagnostics) => return Err(report_failure(&diagnostics)),
    };
    print_diagnostics(&definition.warnings);

    if args.payload {
        let payload = DefinitionPayload::from_definition(&definition);
        let json = serde_json::to_string_pretty(&payload)
            .context("failed to serialize definition payload")?;
        println!("{}", json);
        return Ok(());
    }

    let output_dir = match args.out {
        Some(dir) => dir,
        None => anchor(&workspace, &config.render.output_dir),
    };
    let writer = OutputWriter::new(output_dir);
    for (path, part) in &definition.parts {
        let written = writer.write_part(path, &part.content)?;
        tracing::debug!(part = %path, sha256 = %part.sha256, "wrote {}", written.display());
    }
    println!(
        "Rendered {} part(s) of {} ({}) to {}",
        definition.parts.len(),
        definition.item_type,
        definition.format.as_deref().unwrap_or("Default"),
        writer.root().display()
    );
    Ok(())
}

pub async fn validate(args: ValidateArgs, config_file: Option<&Path>) -> Result<()> {
    let workspace = manifest_dir(&args.manifest);
    let config = load_config(&workspace, config_file)?;
    let manifest = DefinitionManifest::load(&args.manifest)?;

    let registry = FormatRegistry::with_overrides(&config.formats);
    let format = registry.lookup(&manifest.item_type, manifest.format.as_deref())?;
    let diagnostics = validate_definition(&manifest.part_configs(), format);
    if diagnostics.has_errors() {
        return Err(report_failure(&diagnostics));
    }
    print_diagnostics(&diagnostics);

    println!(
        "Definition of {} ({}) is valid: {} part(s)",
        manifest.item_type,
        format.format_label(),
        manifest.definition.len()
    );
    Ok(())
}

pub async fn formats(args: FormatsArgs, config_file: Option<&Path>) -> Result<()> {
    let workspace = std::env::current_dir().context("failed to resolve current directory")?;
    let config = load_config(&workspace, config_file)?;
    let registry = FormatRegistry::with_overrides(&config.formats);

    let listed: Vec<_> = match &args.item_type {
        Some(item_type) => registry.for_item_type(item_type).collect(),
        None => registry.formats().iter().collect(),
    };
    if listed.is_empty() {
        return Err(anyhow!(
            "No definition formats registered for item type '{}'",
            args.item_type.as_deref().unwrap_or_default()
        ));
    }

    for format in listed {
        let paths: Vec<&str> = format.paths.iter().map(String::as_str).collect();
        println!(
            "{:<20} {:<22} {}",
            format.item_type,
            format.format_label(),
            paths.join(", ")
        );
    }
    Ok(())
}

fn load_config(workspace: &Path, config_file: Option<&Path>) -> Result<ItemdefConfig> {
    let config = match config_file {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow!("Config file {} not found", path.display()));
            }
            ConfigLoader::load(path)?
        }
        None => ConfigLoader::load_from_workspace(workspace)?,
    };
    ConfigValidator::validate(&config)?;
    Ok(config)
}

fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn anchor(workspace: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
}

fn report_failure(diagnostics: &Diagnostics) -> anyhow::Error {
    print_diagnostics(diagnostics);
    anyhow!("definition has {} error(s)", diagnostics.error_count())
}
