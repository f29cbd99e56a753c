//! Operator-supplied compiler input properties.
//!
//! Properties arrive as loosely structured YAML. Configuration-bearing
//! properties accept either an inline mapping or a YAML-encoded string;
//! both are kept as [`RawSection`] until the normalizer resolves them.

use std::path::Path;

use otelconf_types::ComponentCategory;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CompileError, Result};

pub const DEFAULT_TELEMETRY_METRICS_PORT: u16 = 14830;
pub const DEFAULT_TELEMETRY_METRICS_LEVEL: &str = "basic";
pub const DEFAULT_INGRESS_GRPC_PORT: u16 = 9100;
pub const DEFAULT_INGRESS_GRPC_ADDRESS: &str = "127.0.0.1";

/// Deserialize an optional group, treating an explicit null as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A configuration property given inline or as YAML text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSection {
    Encoded(String),
    Inline(serde_yaml::Value),
}

/// Per-category allow-list of component types. Absent or empty lists do
/// not restrict anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exporters: Option<Vec<String>>,
}

impl AllowList {
    /// Entries for `category`; categories without an allow-list yield `&[]`.
    #[must_use]
    pub fn entries(&self, category: ComponentCategory) -> &[String] {
        let list = match category {
            ComponentCategory::Processors => self.processors.as_deref(),
            ComponentCategory::Exporters => self.exporters.as_deref(),
            _ => None,
        };
        list.unwrap_or_default()
    }
}

/// A named bundle of secret values: `{name: <n>, <key>: <value>, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretBundle {
    pub name: String,
    #[serde(flatten)]
    pub values: serde_yaml::Mapping,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryProperties {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: TelemetryMetrics,
}

impl TelemetryProperties {
    /// Bind address of the collector's own metrics endpoint.
    #[must_use]
    pub fn metrics_address(&self) -> String {
        format!(
            "127.0.0.1:{}",
            self.metrics.port.unwrap_or(DEFAULT_TELEMETRY_METRICS_PORT)
        )
    }

    #[must_use]
    pub fn metrics_level(&self) -> &str {
        self.metrics
            .level
            .as_deref()
            .unwrap_or(DEFAULT_TELEMETRY_METRICS_LEVEL)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrpcIngress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressProperties {
    #[serde(default, deserialize_with = "null_as_default")]
    pub grpc: GrpcIngress,
}

impl IngressProperties {
    /// `<address>:<port>` for the builtin OTLP receiver.
    #[must_use]
    pub fn grpc_endpoint(&self) -> String {
        format!(
            "{}:{}",
            self.grpc
                .address
                .as_deref()
                .unwrap_or(DEFAULT_INGRESS_GRPC_ADDRESS),
            self.grpc.port.unwrap_or(DEFAULT_INGRESS_GRPC_PORT)
        )
    }
}

fn default_enabled() -> bool {
    true
}

fn null_as_enabled<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|v| v.unwrap_or_else(default_enabled))
}

/// Complete compiler input. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default = "default_enabled", deserialize_with = "null_as_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RawSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_exporters: Option<RawSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_exporters: Option<RawSection>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allow_list: AllowList,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secrets: Vec<SecretBundle>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub telemetry: TelemetryProperties,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingress: IngressProperties,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            config: None,
            metric_exporters: None,
            trace_exporters: None,
            allow_list: AllowList::default(),
            secrets: Vec::new(),
            telemetry: TelemetryProperties::default(),
            ingress: IngressProperties::default(),
        }
    }
}

impl Properties {
    /// Parse properties from YAML text. An empty document yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MalformedProperty`] if the YAML is invalid or
    /// a property has the wrong type.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| CompileError::MalformedProperty {
            property: "properties",
            reason: e.to_string(),
        })
    }

    /// Read and parse a properties file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Attach an inline `config` mapping.
    #[must_use]
    pub fn with_config(mut self, config: serde_yaml::Value) -> Self {
        self.config = Some(RawSection::Inline(config));
        self
    }
}
