//! `{{ .name.key }}` placeholder substitution from supplied secrets.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_yaml::Value;

use crate::document::{scalar_to_string, ConfigDocument};
use crate::error::{CompileError, Result};
use crate::properties::SecretBundle;

/// `{{`, optional blanks, `.name.key`, optional blanks, `}}`.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{[ \t]*\.([^.\s{}]+)\.([^.\s{}]+)[ \t]*\}\}").expect("valid placeholder regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
struct SecretEntry {
    id: String,
    value: String,
}

/// Flattened `name.key → value` secrets in supply order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretSet {
    entries: Vec<SecretEntry>,
}

impl SecretSet {
    /// Flatten bundles into `name.key` entries. Values follow YAML scalar
    /// typing: an unquoted `1.10` is the number `1.1`, so values that must
    /// keep their exact text are quoted.
    #[must_use]
    pub fn from_bundles(bundles: &[SecretBundle]) -> Self {
        let entries = bundles
            .iter()
            .flat_map(|bundle| {
                bundle.values.iter().map(move |(key, value)| SecretEntry {
                    id: format!("{}.{}", bundle.name, scalar_to_string(key)),
                    value: scalar_to_string(value),
                })
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Secret ids (`name.key`) in supply order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }
}

struct Interpolation<'a> {
    secrets: &'a SecretSet,
    used: Vec<bool>,
    missing: Vec<String>,
}

impl Interpolation<'_> {
    fn visit(&mut self, value: &mut Value) {
        match value {
            Value::String(text) => {
                if let Some(replaced) = self.substitute(text) {
                    *text = replaced;
                }
            }
            Value::Sequence(items) => items.iter_mut().for_each(|item| self.visit(item)),
            Value::Mapping(mapping) => mapping.values_mut().for_each(|v| self.visit(v)),
            Value::Tagged(tagged) => self.visit(&mut tagged.value),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    fn substitute(&mut self, text: &str) -> Option<String> {
        if !PLACEHOLDER_RE.is_match(text) {
            return None;
        }
        let replaced = PLACEHOLDER_RE.replace_all(text, |caps: &Captures<'_>| {
            let id = format!("{}.{}", &caps[1], &caps[2]);
            let mut resolved = None;
            for (i, entry) in self.secrets.entries.iter().enumerate() {
                if entry.id == id {
                    self.used[i] = true;
                    if resolved.is_none() && !entry.value.is_empty() {
                        resolved = Some(entry.value.clone());
                    }
                }
            }
            resolved.unwrap_or_else(|| {
                self.missing.push(caps[0].to_string());
                caps[0].to_string()
            })
        });
        Some(replaced.into_owned())
    }
}

/// Replace every recognised placeholder in the document's string values.
///
/// # Errors
///
/// Returns [`CompileError::MissingSecrets`] if any placeholder has no
/// non-empty value, otherwise [`CompileError::UnusedSecrets`] if a supplied
/// secret was never referenced.
pub fn interpolate(document: &mut ConfigDocument, secrets: &SecretSet) -> Result<()> {
    let mut pass = Interpolation {
        secrets,
        used: vec![false; secrets.len()],
        missing: Vec::new(),
    };
    for section in document.sections_mut() {
        section.values_mut().for_each(|v| pass.visit(v));
    }

    if !pass.missing.is_empty() {
        return Err(CompileError::MissingSecrets {
            placeholders: pass.missing,
        });
    }

    let unused: Vec<String> = secrets
        .entries
        .iter()
        .zip(&pass.used)
        .filter(|(_, used)| !**used)
        .map(|(entry, _)| entry.id.clone())
        .collect();
    if !unused.is_empty() {
        return Err(CompileError::UnusedSecrets { secrets: unused });
    }

    tracing::debug!(secrets = secrets.len(), "Secrets interpolated");
    Ok(())
}
