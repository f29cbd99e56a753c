pub mod check;
pub mod compile;
pub mod components;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use otelconf_compiler::Properties;
use otelconf_types::{BuildManifest, ComponentSet, TypeResolver};

/// Build manifest arguments shared by every command.
#[derive(Debug, Clone, Args)]
pub struct ManifestArgs {
    /// Path to the collector builder manifest
    #[arg(long)]
    pub manifest: PathBuf,
    /// YAML map of module path to component type, for modules the
    /// built-in resolution gets wrong
    #[arg(long)]
    pub type_overrides: Option<PathBuf>,
}

impl ManifestArgs {
    /// Load the manifest and resolve it into the distribution's component set.
    pub fn load_registry(&self) -> Result<ComponentSet> {
        let manifest = BuildManifest::load(&self.manifest).with_context(|| {
            format!("Failed to load build manifest: {}", self.manifest.display())
        })?;

        let mut resolver = TypeResolver::new();
        if let Some(path) = &self.type_overrides {
            resolver = resolver
                .with_overrides_file(path)
                .with_context(|| format!("Failed to load type overrides: {}", path.display()))?;
        }

        Ok(ComponentSet::from_manifest(&manifest, &resolver))
    }
}

fn load_properties(path: &Path) -> Result<Properties> {
    Properties::load(path)
        .with_context(|| format!("Failed to load properties: {}", path.display()))
}
