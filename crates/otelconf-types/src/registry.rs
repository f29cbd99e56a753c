//! Lookup of component types compiled into the collector distribution.

use std::collections::{BTreeMap, BTreeSet};

use crate::component::ComponentCategory;
use crate::manifest::{BuildManifest, TypeResolver};

/// Read-only table of the component types available per category.
///
/// The compiler's validator depends on this trait rather than on a concrete
/// manifest so callers can substitute a fixed set in tests.
pub trait ComponentRegistry: Send + Sync {
    /// Types available in `category`, sorted.
    fn available(&self, category: ComponentCategory) -> &BTreeSet<String>;

    /// True when `kind` is available in `category`.
    fn contains(&self, category: ComponentCategory, kind: &str) -> bool {
        self.available(category).contains(kind)
    }
}

/// Concrete [`ComponentRegistry`] backed by per-category type sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSet {
    types: BTreeMap<ComponentCategory, BTreeSet<String>>,
    empty: BTreeSet<String>,
}

impl ComponentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add types to a category.
    #[must_use]
    pub fn with<I, S>(mut self, category: ComponentCategory, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types
            .entry(category)
            .or_default()
            .extend(kinds.into_iter().map(Into::into));
        self
    }

    /// Resolve every manifest entry to its component type.
    #[must_use]
    pub fn from_manifest(manifest: &BuildManifest, resolver: &TypeResolver) -> Self {
        let mut set = Self::new();
        for category in ComponentCategory::ALL {
            let kinds: BTreeSet<String> = manifest
                .entries(category)
                .iter()
                .map(|entry| resolver.resolve(category, entry.module_path()))
                .collect();
            if !kinds.is_empty() {
                tracing::debug!(%category, types = ?kinds, "Resolved manifest components");
                set.types.insert(category, kinds);
            }
        }
        set
    }
}

impl ComponentRegistry for ComponentSet {
    fn available(&self, category: ComponentCategory) -> &BTreeSet<String> {
        self.types.get(&category).unwrap_or(&self.empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ModuleEntry;

    #[test]
    fn test_from_manifest_resolves_and_sorts() {
        let manifest = BuildManifest {
            exporters: vec![
                ModuleEntry::new("go.opentelemetry.io/collector/exporter/otlpexporter v0.120.0"),
                ModuleEntry::new("go.opentelemetry.io/collector/exporter/debugexporter v0.120.0"),
            ],
            processors: vec![ModuleEntry::new(
                "go.opentelemetry.io/collector/processor/batchprocessor v0.120.0",
            )],
            ..BuildManifest::default()
        };
        let set = ComponentSet::from_manifest(&manifest, &TypeResolver::new());
        let exporters: Vec<&str> = set
            .available(ComponentCategory::Exporters)
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(exporters, vec!["debug", "otlp"]);
        assert!(set.contains(ComponentCategory::Processors, "batch"));
        assert!(set.available(ComponentCategory::Receivers).is_empty());
    }

    #[test]
    fn test_stub_set() {
        let set = ComponentSet::new()
            .with(ComponentCategory::Processors, ["batch"])
            .with(ComponentCategory::Processors, ["filter"]);
        assert_eq!(set.available(ComponentCategory::Processors).len(), 2);
        assert!(!set.contains(ComponentCategory::Exporters, "otlp"));
    }
}
