//! Compilation entry point wiring the stages together.

use std::path::PathBuf;

use otelconf_types::{ComponentCategory, ComponentRegistry};

use crate::assemble::{self, AssemblySettings};
use crate::document::ConfigDocument;
use crate::emit;
use crate::error::Result;
use crate::normalize::{normalize, Normalized};
use crate::properties::Properties;
use crate::secrets::{self, SecretSet};
use crate::validator;

/// Deployment config directory used when none is supplied.
pub const DEFAULT_CONFIG_DIR: &str = "/var/vcap/jobs/otel-collector/config";

/// Host-side settings that are not operator properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    /// Directory holding the collector's `certs/`.
    pub config_dir: PathBuf,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
        }
    }
}

/// Result of a successful compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Compilation {
    /// The collector is disabled and nothing was configured.
    Disabled,
    Document(ConfigDocument),
}

impl Compilation {
    #[must_use]
    pub fn document(&self) -> Option<&ConfigDocument> {
        match self {
            Self::Disabled => None,
            Self::Document(d) => Some(d),
        }
    }

    #[must_use]
    pub fn into_document(self) -> Option<ConfigDocument> {
        match self {
            Self::Disabled => None,
            Self::Document(d) => Some(d),
        }
    }
}

/// Compiles [`Properties`] against a fixed component registry.
///
/// Holds no mutable state; one compiler may serve any number of
/// compilations.
pub struct Compiler<'r> {
    registry: &'r dyn ComponentRegistry,
    settings: CompilerSettings,
}

impl<'r> Compiler<'r> {
    #[must_use]
    pub fn new(registry: &'r dyn ComponentRegistry, settings: CompilerSettings) -> Self {
        Self { registry, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Compile properties into a collector configuration document.
    ///
    /// # Errors
    ///
    /// Returns the first [`CompileError`](crate::CompileError) raised by
    /// normalisation, legacy assembly, secret interpolation or validation.
    pub fn compile(&self, properties: &Properties) -> Result<Compilation> {
        let mut document = match normalize(properties)? {
            Normalized::Disabled => return Ok(Compilation::Disabled),
            Normalized::Modern(document) => document,
            Normalized::Legacy(legacy) => assemble::from_legacy(legacy)?,
        };

        let secrets = SecretSet::from_bundles(&properties.secrets);
        secrets::interpolate(&mut document, &secrets)?;

        validator::validate_document(&document, self.registry, &properties.allow_list)?;

        assemble::finalize(
            &mut document,
            &AssemblySettings {
                config_dir: &self.settings.config_dir,
                ingress: &properties.ingress,
                telemetry: &properties.telemetry,
            },
        )?;

        tracing::info!(
            pipelines = document.pipelines().map_or(0, serde_yaml::Mapping::len),
            processors = document.component_names(ComponentCategory::Processors).len(),
            exporters = document.component_names(ComponentCategory::Exporters).len(),
            "Configuration compiled"
        );
        Ok(Compilation::Document(document))
    }

    /// Compile and serialise to YAML. A disabled collector yields an empty
    /// string.
    ///
    /// # Errors
    ///
    /// Returns any compilation or serialisation error.
    pub fn compile_to_yaml(&self, properties: &Properties) -> Result<String> {
        match self.compile(properties)? {
            Compilation::Disabled => Ok(String::new()),
            Compilation::Document(document) => emit::to_yaml(&document),
        }
    }
}
