//! Collector build manifest and module-path → component type resolution.
//!
//! A [`BuildManifest`] is the collector builder configuration listing the
//! Go modules compiled into the distribution. Each module is mapped to the
//! component type operators write in their configuration (e.g.
//! `go.opentelemetry.io/collector/processor/batchprocessor` → `batch`) by a
//! [`TypeResolver`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::component::ComponentCategory;

/// Errors produced while loading a manifest or a type override table.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("manifest entry in {category} has an empty gomod")]
    EmptyModule { category: ComponentCategory },
}

pub type Result<T> = std::result::Result<T, ManifestError>;

// ── Manifest ────────────────────────────────────────────────────────

/// One `- gomod: <module-path> <version>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub gomod: String,
}

impl ModuleEntry {
    #[must_use]
    pub fn new(gomod: impl Into<String>) -> Self {
        Self {
            gomod: gomod.into(),
        }
    }

    /// Module path with the version suffix removed.
    #[must_use]
    pub fn module_path(&self) -> &str {
        self.gomod.split_whitespace().next().unwrap_or_default()
    }

    /// Declared module version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.gomod.split_whitespace().nth(1)
    }
}

/// Collector builder manifest. Keys other than the component lists
/// (`dist`, `replaces`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub receivers: Vec<ModuleEntry>,
    #[serde(default)]
    pub processors: Vec<ModuleEntry>,
    #[serde(default)]
    pub exporters: Vec<ModuleEntry>,
    #[serde(default)]
    pub extensions: Vec<ModuleEntry>,
    #[serde(default)]
    pub connectors: Vec<ModuleEntry>,
}

impl BuildManifest {
    /// Parse a manifest from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or an entry has an empty `gomod`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(yaml).map_err(|source| ManifestError::Parse {
            what: "build manifest".to_string(),
            source,
        })?;
        for category in ComponentCategory::ALL {
            if manifest
                .entries(category)
                .iter()
                .any(|e| e.module_path().is_empty())
            {
                return Err(ManifestError::EmptyModule { category });
            }
        }
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        let manifest = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            processors = manifest.processors.len(),
            exporters = manifest.exporters.len(),
            "Loaded build manifest"
        );
        Ok(manifest)
    }

    #[must_use]
    pub fn entries(&self, category: ComponentCategory) -> &[ModuleEntry] {
        match category {
            ComponentCategory::Receivers => &self.receivers,
            ComponentCategory::Processors => &self.processors,
            ComponentCategory::Exporters => &self.exporters,
            ComponentCategory::Extensions => &self.extensions,
            ComponentCategory::Connectors => &self.connectors,
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })
}

// ── Type resolution ─────────────────────────────────────────────────

/// Upstream modules whose component type does not follow the
/// `<type><category>` module naming convention.
const KNOWN_MODULE_TYPES: &[(&str, &str)] = &[
    (
        "go.opentelemetry.io/collector/processor/memorylimiterprocessor",
        "memory_limiter",
    ),
    (
        "github.com/open-telemetry/opentelemetry-collector-contrib/processor/tailsamplingprocessor",
        "tail_sampling",
    ),
    (
        "github.com/open-telemetry/opentelemetry-collector-contrib/processor/probabilisticsamplerprocessor",
        "probabilistic_sampler",
    ),
    (
        "github.com/open-telemetry/opentelemetry-collector-contrib/exporter/splunkhecexporter",
        "splunk_hec",
    ),
    (
        "github.com/open-telemetry/opentelemetry-collector-contrib/extension/healthcheckextension",
        "health_check",
    ),
    (
        "github.com/open-telemetry/opentelemetry-collector-contrib/extension/basicauthextension",
        "basicauth",
    ),
    (
        "github.com/open-telemetry/opentelemetry-collector-contrib/receiver/hostmetricsreceiver",
        "hostmetrics",
    ),
];

/// Metadata lookup from Go module path to component type name.
///
/// Resolution order: explicit overrides, the built-in table of upstream
/// exceptions, then the naming convention (last path segment with the
/// category suffix stripped).
#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    overrides: BTreeMap<String, String>,
}

impl TypeResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add explicit `module path → type` overrides.
    #[must_use]
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Load overrides from a YAML mapping file of `module-path: type`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a string mapping.
    pub fn with_overrides_file(self, path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        let table: BTreeMap<String, String> =
            serde_yaml::from_str(&content).map_err(|source| ManifestError::Parse {
                what: format!("type overrides {}", path.display()),
                source,
            })?;
        tracing::debug!(path = %path.display(), entries = table.len(), "Loaded type overrides");
        Ok(self.with_overrides(table))
    }

    /// Resolve the component type for a module of the given category.
    #[must_use]
    pub fn resolve(&self, category: ComponentCategory, module_path: &str) -> String {
        if let Some(kind) = self.overrides.get(module_path) {
            return kind.clone();
        }
        if let Some((_, kind)) = KNOWN_MODULE_TYPES.iter().find(|(m, _)| *m == module_path) {
            return (*kind).to_string();
        }
        conventional_type(category, module_path)
    }
}

fn conventional_type(category: ComponentCategory, module_path: &str) -> String {
    let mut segments = module_path.rsplit('/');
    let mut last = segments.next().unwrap_or(module_path);
    if is_major_version(last) {
        last = segments.next().unwrap_or(last);
    }
    last.strip_suffix(category.module_suffix())
        .filter(|s| !s.is_empty())
        .unwrap_or(last)
        .to_string()
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MANIFEST: &str = r"
dist:
  name: otel-collector
  output_path: ./dist
processors:
  - gomod: go.opentelemetry.io/collector/processor/batchprocessor v0.120.0
  - gomod: go.opentelemetry.io/collector/processor/memorylimiterprocessor v0.120.0
exporters:
  - gomod: go.opentelemetry.io/collector/exporter/otlpexporter v0.120.0
  - gomod: github.com/open-telemetry/opentelemetry-collector-contrib/exporter/prometheusexporter v0.120.0
";

    #[test]
    fn test_parse_builder_manifest() {
        let manifest = BuildManifest::from_yaml_str(MANIFEST).unwrap();
        assert_eq!(manifest.processors.len(), 2);
        assert_eq!(manifest.exporters.len(), 2);
        assert!(manifest.receivers.is_empty());
        assert_eq!(
            manifest.processors[0].module_path(),
            "go.opentelemetry.io/collector/processor/batchprocessor"
        );
        assert_eq!(manifest.processors[0].version(), Some("v0.120.0"));
    }

    #[test]
    fn test_empty_gomod_rejected() {
        let err = BuildManifest::from_yaml_str("exporters:\n  - gomod: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("exporters"), "got: {err}");
    }

    #[test]
    fn test_invalid_manifest_yaml() {
        let err = BuildManifest::from_yaml_str("processors: [gomod: {").unwrap_err();
        assert!(err.to_string().contains("build manifest"));
    }

    #[test]
    fn test_conventional_resolution() {
        let resolver = TypeResolver::new();
        assert_eq!(
            resolver.resolve(
                ComponentCategory::Processors,
                "go.opentelemetry.io/collector/processor/batchprocessor"
            ),
            "batch"
        );
        assert_eq!(
            resolver.resolve(
                ComponentCategory::Exporters,
                "go.opentelemetry.io/collector/exporter/otlphttpexporter"
            ),
            "otlphttp"
        );
        assert_eq!(
            resolver.resolve(
                ComponentCategory::Exporters,
                "github.com/example/exporter/customexporter/v2"
            ),
            "custom"
        );
    }

    #[test]
    fn test_known_exception_resolution() {
        let resolver = TypeResolver::new();
        assert_eq!(
            resolver.resolve(
                ComponentCategory::Processors,
                "go.opentelemetry.io/collector/processor/memorylimiterprocessor"
            ),
            "memory_limiter"
        );
    }

    #[test]
    fn test_override_wins() {
        let resolver = TypeResolver::new().with_overrides([(
            "go.opentelemetry.io/collector/processor/batchprocessor",
            "batching",
        )]);
        assert_eq!(
            resolver.resolve(
                ComponentCategory::Processors,
                "go.opentelemetry.io/collector/processor/batchprocessor"
            ),
            "batching"
        );
    }

    #[test]
    fn test_suffix_only_module_keeps_name() {
        let resolver = TypeResolver::new();
        assert_eq!(
            resolver.resolve(ComponentCategory::Exporters, "example.com/exporter"),
            "exporter"
        );
    }

    #[test]
    fn test_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "example.com/acme/weirdexporter: acme").unwrap();
        let resolver = TypeResolver::new().with_overrides_file(file.path()).unwrap();
        assert_eq!(
            resolver.resolve(ComponentCategory::Exporters, "example.com/acme/weirdexporter"),
            "acme"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = BuildManifest::load(Path::new("/nonexistent/builder-config.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
