//! Deterministic serialisation of the compiled document.

use crate::document::ConfigDocument;
use crate::error::Result;

/// Serialise to YAML. Sections are emitted in fixed order, their contents
/// in insertion order.
///
/// # Errors
///
/// Returns an error if the document cannot be serialised.
pub fn to_yaml(document: &ConfigDocument) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

/// Serialise to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the document holds values JSON cannot express
/// (e.g. non-string mapping keys).
pub fn to_json_pretty(document: &ConfigDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}
