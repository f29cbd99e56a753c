//! Namespace, manifest-membership, allow-list and port validation.
//!
//! Rules run in a fixed order and the first violation is reported:
//! presence, reserved namespace, manifest membership, allow-list, port
//! conflict.

use std::collections::BTreeSet;

use otelconf_types::{ComponentCategory, ComponentName, ComponentRegistry};
use serde_yaml::Value;

use crate::document::ConfigDocument;
use crate::error::{CompileError, Result};
use crate::properties::AllowList;

/// Port of the platform's own metrics scrape endpoint.
pub const RESERVED_PROMETHEUS_PORT: u16 = 8889;

/// Categories whose component types are checked against the manifest.
const CHECKED_CATEGORIES: [ComponentCategory; 2] =
    [ComponentCategory::Processors, ComponentCategory::Exporters];

/// Validate an operator document against the registry and allow-list.
///
/// # Errors
///
/// Returns the first violated rule as a [`CompileError`].
pub fn validate_document(
    document: &ConfigDocument,
    registry: &dyn ComponentRegistry,
    allow_list: &AllowList,
) -> Result<()> {
    check_presence(document)?;
    for category in CHECKED_CATEGORIES {
        check_reserved_namespace(document, category)?;
    }
    for category in CHECKED_CATEGORIES {
        check_manifest_membership(document, registry, category)?;
    }
    for category in CHECKED_CATEGORIES {
        check_allow_list(document, registry, allow_list, category)?;
    }
    check_prometheus_ports(document)?;
    Ok(())
}

fn check_presence(document: &ConfigDocument) -> Result<()> {
    if document.exporters.is_none() {
        return Err(CompileError::ExporterConfigurationRequired);
    }
    if document.service.is_none() {
        return Err(CompileError::ServiceConfigurationRequired);
    }
    Ok(())
}

fn check_reserved_namespace(document: &ConfigDocument, category: ComponentCategory) -> Result<()> {
    let names = document.component_names(category);
    if let Some(name) = names.iter().find(|n| ComponentName::parse(n).is_reserved()) {
        tracing::debug!(%category, component = %name, "Reserved namespace used");
        return Err(CompileError::ReservedNamespaceViolation { category });
    }
    Ok(())
}

/// Distinct configured types in a category, sorted.
fn configured_types(document: &ConfigDocument, category: ComponentCategory) -> BTreeSet<String> {
    document
        .component_names(category)
        .iter()
        .map(|n| ComponentName::parse(n).kind().to_string())
        .collect()
}

fn check_manifest_membership(
    document: &ConfigDocument,
    registry: &dyn ComponentRegistry,
    category: ComponentCategory,
) -> Result<()> {
    let available = registry.available(category);
    let unsupported: Vec<String> = configured_types(document, category)
        .into_iter()
        .filter(|kind| !available.contains(kind))
        .collect();
    if unsupported.is_empty() {
        return Ok(());
    }
    Err(CompileError::UnsupportedComponent {
        category,
        unsupported,
        available: available.iter().cloned().collect(),
    })
}

fn check_allow_list(
    document: &ConfigDocument,
    registry: &dyn ComponentRegistry,
    allow_list: &AllowList,
    category: ComponentCategory,
) -> Result<()> {
    let entries = allow_list.entries(category);
    if entries.is_empty() {
        return Ok(());
    }

    let available = registry.available(category);
    let unrecognized: BTreeSet<&String> =
        entries.iter().filter(|e| !available.contains(*e)).collect();
    if !unrecognized.is_empty() {
        return Err(CompileError::UnrecognizedAllowListEntry {
            category,
            entries: unrecognized.into_iter().cloned().collect(),
            available: available.iter().cloned().collect(),
        });
    }

    let allowed: BTreeSet<&str> = entries.iter().map(String::as_str).collect();
    let disallowed: Vec<String> = configured_types(document, category)
        .into_iter()
        .filter(|kind| !allowed.contains(kind.as_str()))
        .collect();
    if !disallowed.is_empty() {
        return Err(CompileError::DisallowedComponent {
            category,
            disallowed,
        });
    }
    Ok(())
}

fn check_prometheus_ports(document: &ConfigDocument) -> Result<()> {
    let Some(exporters) = document.exporters.as_ref() else {
        return Ok(());
    };
    for (name, settings) in exporters {
        let Some(name) = name.as_str() else {
            continue;
        };
        if ComponentName::parse(name).kind() != "prometheus" {
            continue;
        }
        let port = settings.get("endpoint").and_then(endpoint_port);
        if port == Some(RESERVED_PROMETHEUS_PORT) {
            return Err(CompileError::ReservedPortConflict {
                exporter: name.to_string(),
                port: RESERVED_PROMETHEUS_PORT,
            });
        }
    }
    Ok(())
}

/// Port of a `host:port` endpoint (`[::]:8889`, `:8889` included).
fn endpoint_port(endpoint: &Value) -> Option<u16> {
    match endpoint {
        Value::String(s) => s.rsplit_once(':')?.1.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        _ => None,
    }
}
