//! Input normalisation: resolve raw properties into a single canonical form.

use serde_yaml::{Mapping, Value};

use crate::document::ConfigDocument;
use crate::error::{CompileError, Result};
use crate::properties::{Properties, RawSection};

/// Legacy shorthand: exporters keyed by signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyExporters {
    pub metric: Mapping,
    pub trace: Mapping,
}

/// Outcome of normalisation, decided once per compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// No configuration supplied and the collector is disabled.
    Disabled,
    /// The generic `config` block.
    Modern(ConfigDocument),
    /// The deprecated `metric_exporters` / `trace_exporters` shorthand.
    Legacy(LegacyExporters),
}

/// Resolve `config`, `metric_exporters` and `trace_exporters`.
///
/// # Errors
///
/// Returns [`CompileError::ConflictingConfiguration`] if `config` is combined
/// with a legacy property, or [`CompileError::MalformedProperty`] if a
/// property is not a mapping or not valid YAML.
pub fn normalize(properties: &Properties) -> Result<Normalized> {
    let legacy_supplied =
        properties.metric_exporters.is_some() || properties.trace_exporters.is_some();

    match &properties.config {
        Some(_) if legacy_supplied => Err(CompileError::ConflictingConfiguration),
        Some(raw) => {
            let value = decode("config", raw)?;
            let document =
                ConfigDocument::from_value(value).map_err(|e| CompileError::MalformedProperty {
                    property: "config",
                    reason: e.to_string(),
                })?;
            tracing::debug!("Using generic config block");
            Ok(Normalized::Modern(document))
        }
        None if legacy_supplied => {
            let metric = decode_mapping("metric_exporters", properties.metric_exporters.as_ref())?;
            let trace = decode_mapping("trace_exporters", properties.trace_exporters.as_ref())?;
            tracing::warn!(
                "metric_exporters/trace_exporters are deprecated, use the config property instead"
            );
            Ok(Normalized::Legacy(LegacyExporters { metric, trace }))
        }
        None if !properties.enabled => {
            tracing::debug!("Collector disabled and no configuration supplied");
            Ok(Normalized::Disabled)
        }
        None => Ok(Normalized::Modern(ConfigDocument::default())),
    }
}

/// Parse a raw property and expand `<<` merge keys, so validation sees
/// the same settings the collector will load.
fn decode(property: &'static str, raw: &RawSection) -> Result<Value> {
    let mut value = match raw {
        RawSection::Inline(value) => value.clone(),
        RawSection::Encoded(text) => {
            serde_yaml::from_str(text).map_err(|e| CompileError::MalformedProperty {
                property,
                reason: format!("not valid YAML: {e}"),
            })?
        }
    };
    value
        .apply_merge()
        .map_err(|e| CompileError::MalformedProperty {
            property,
            reason: format!("invalid merge key: {e}"),
        })?;
    Ok(value)
}

fn decode_mapping(property: &'static str, raw: Option<&RawSection>) -> Result<Mapping> {
    let Some(raw) = raw else {
        return Ok(Mapping::new());
    };
    match decode(property, raw)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(CompileError::MalformedProperty {
            property,
            reason: "expected a mapping of exporter name to configuration".to_string(),
        }),
    }
}
