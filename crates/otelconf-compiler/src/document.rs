//! Canonical in-memory collector configuration document.

use otelconf_types::ComponentCategory;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Collector configuration with the five well-known sections.
///
/// Section contents are YAML mappings that keep insertion order. Top-level
/// keys outside the known sections (e.g. `connectors`) are carried in
/// `extra` and emitted after them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receivers: Option<Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processors: Option<Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exporters: Option<Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Mapping>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl ConfigDocument {
    /// Build a document from a parsed YAML value. Null yields an empty document.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a mapping or a section has the
    /// wrong shape.
    pub fn from_value(value: Value) -> Result<Self, serde_yaml::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    /// The mapping for a component section, if present.
    #[must_use]
    pub fn section(&self, category: ComponentCategory) -> Option<&Mapping> {
        match category {
            ComponentCategory::Receivers => self.receivers.as_ref(),
            ComponentCategory::Processors => self.processors.as_ref(),
            ComponentCategory::Exporters => self.exporters.as_ref(),
            ComponentCategory::Extensions => self.extensions.as_ref(),
            ComponentCategory::Connectors => match self.extra.get("connectors") {
                Some(Value::Mapping(m)) => Some(m),
                _ => None,
            },
        }
    }

    /// Configured component names in a section, in document order.
    #[must_use]
    pub fn component_names(&self, category: ComponentCategory) -> Vec<String> {
        self.section(category)
            .map(|section| section.keys().map(scalar_to_string).collect())
            .unwrap_or_default()
    }

    /// `service.pipelines`, if present and a mapping.
    #[must_use]
    pub fn pipelines(&self) -> Option<&Mapping> {
        match self.service.as_ref()?.get("pipelines") {
            Some(Value::Mapping(p)) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn pipelines_mut(&mut self) -> Option<&mut Mapping> {
        match self.service.as_mut()?.get_mut("pipelines") {
            Some(Value::Mapping(p)) => Some(p),
            _ => None,
        }
    }

    /// Every present section in emission order, for value traversal.
    pub(crate) fn sections_mut(&mut self) -> impl Iterator<Item = &mut Mapping> {
        [
            self.receivers.as_mut(),
            self.processors.as_mut(),
            self.exporters.as_mut(),
            self.extensions.as_mut(),
            self.service.as_mut(),
            Some(&mut self.extra),
        ]
        .into_iter()
        .flatten()
    }
}

/// Render a scalar YAML value (typically a mapping key) as text.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sections_are_absent() {
        let doc: ConfigDocument = serde_yaml::from_str("exporters: ~\nservice: {}\n").unwrap();
        assert!(doc.exporters.is_none());
        assert!(doc.service.is_some());
    }

    #[test]
    fn test_extra_sections_are_kept() {
        let doc: ConfigDocument =
            serde_yaml::from_str("connectors:\n  forward: {}\nexporters: {}\n").unwrap();
        assert!(doc.extra.contains_key("connectors"));
        assert_eq!(doc.component_names(ComponentCategory::Connectors), vec!["forward"]);
    }

    #[test]
    fn test_component_names_in_order() {
        let doc: ConfigDocument =
            serde_yaml::from_str("processors:\n  filter: ~\n  batch: ~\n  batch/2: ~\n").unwrap();
        assert_eq!(
            doc.component_names(ComponentCategory::Processors),
            vec!["filter", "batch", "batch/2"]
        );
        assert!(doc.component_names(ComponentCategory::Exporters).is_empty());
    }

    #[test]
    fn test_non_mapping_is_rejected() {
        let value: Value = serde_yaml::from_str("- a\n- b\n").unwrap();
        assert!(ConfigDocument::from_value(value).is_err());
        assert_eq!(
            ConfigDocument::from_value(Value::Null).unwrap(),
            ConfigDocument::default()
        );
    }

    #[test]
    fn test_pipelines_lookup() {
        let doc: ConfigDocument = serde_yaml::from_str(
            "service:\n  pipelines:\n    traces:\n      exporters: [otlp]\n",
        )
        .unwrap();
        assert_eq!(doc.pipelines().map(Mapping::len), Some(1));
    }
}
