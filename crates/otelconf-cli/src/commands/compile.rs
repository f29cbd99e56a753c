use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use otelconf_compiler::{emit, Compilation, Compiler, CompilerSettings};

use super::{load_properties, ManifestArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Execute the `compile` command: write the compiled document to `output`
/// or stdout.
pub fn execute(
    properties_path: &Path,
    manifest: &ManifestArgs,
    config_dir: Option<PathBuf>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let rendered = render(properties_path, manifest, config_dir, format)?;
    let Some(rendered) = rendered else {
        tracing::info!("Collector disabled, nothing to write");
        return Ok(());
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            tracing::info!(path = %path.display(), "Configuration written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Compile and serialise; `None` when the collector is disabled.
fn render(
    properties_path: &Path,
    manifest: &ManifestArgs,
    config_dir: Option<PathBuf>,
    format: OutputFormat,
) -> Result<Option<String>> {
    let registry = manifest.load_registry()?;
    let properties = load_properties(properties_path)?;

    let mut settings = CompilerSettings::default();
    if let Some(dir) = config_dir {
        settings.config_dir = dir;
    }
    let compiler = Compiler::new(&registry, settings);

    let document = match compiler
        .compile(&properties)
        .with_context(|| format!("Failed to compile {}", properties_path.display()))?
    {
        Compilation::Disabled => return Ok(None),
        Compilation::Document(document) => document,
    };

    let rendered = match format {
        OutputFormat::Yaml => emit::to_yaml(&document)?,
        OutputFormat::Json => {
            let mut json = emit::to_json_pretty(&document)?;
            json.push('\n');
            json
        }
    };
    Ok(Some(rendered))
}
