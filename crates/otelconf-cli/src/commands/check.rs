use std::path::Path;

use anyhow::{Context, Result};
use otelconf_compiler::{Compilation, Compiler, CompilerSettings};

use super::{load_properties, ManifestArgs};

/// Execute the `check` command: compile the properties and report the outcome.
pub fn execute(properties_path: &Path, manifest: &ManifestArgs) -> Result<()> {
    let registry = manifest.load_registry()?;
    let properties = load_properties(properties_path)?;

    let compiler = Compiler::new(&registry, CompilerSettings::default());
    let compiled = compiler
        .compile(&properties)
        .with_context(|| format!("Configuration check failed: {}", properties_path.display()))?;

    match compiled {
        Compilation::Disabled => println!("Configuration: OK (collector disabled)"),
        Compilation::Document(_) => println!("Configuration: OK"),
    }
    Ok(())
}
