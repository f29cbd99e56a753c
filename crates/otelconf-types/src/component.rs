//! Collector component categories and `type[/qualifier]` component names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Qualifier prefix reserved for components emitted by the compiler itself.
pub const RESERVED_QUALIFIER_PREFIX: &str = "cf-internal-";

/// Top-level component section of a collector configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    Receivers,
    Processors,
    Exporters,
    Extensions,
    Connectors,
}

impl ComponentCategory {
    /// All categories in configuration section order.
    pub const ALL: [ComponentCategory; 5] = [
        Self::Receivers,
        Self::Processors,
        Self::Exporters,
        Self::Extensions,
        Self::Connectors,
    ];

    /// Section key as it appears in a collector configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Receivers => "receivers",
            Self::Processors => "processors",
            Self::Exporters => "exporters",
            Self::Extensions => "extensions",
            Self::Connectors => "connectors",
        }
    }

    /// Capitalised form used at the start of operator-facing messages.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Receivers => "Receivers",
            Self::Processors => "Processors",
            Self::Exporters => "Exporters",
            Self::Extensions => "Extensions",
            Self::Connectors => "Connectors",
        }
    }

    /// Module-name suffix used by upstream Go modules of this category
    /// (e.g. `batchprocessor`).
    #[must_use]
    pub fn module_suffix(self) -> &'static str {
        match self {
            Self::Receivers => "receiver",
            Self::Processors => "processor",
            Self::Exporters => "exporter",
            Self::Extensions => "extension",
            Self::Connectors => "connector",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured component name: `type` or `type/qualifier`.
///
/// The qualifier is everything after the first `/` and may itself contain
/// further `/` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentName<'a> {
    raw: &'a str,
    kind: &'a str,
    qualifier: Option<&'a str>,
}

impl<'a> ComponentName<'a> {
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once('/') {
            Some((kind, qualifier)) => Self {
                raw,
                kind,
                qualifier: Some(qualifier),
            },
            None => Self {
                raw,
                kind: raw,
                qualifier: None,
            },
        }
    }

    /// The component type, e.g. `otlp` for `otlp/backend`.
    #[must_use]
    pub fn kind(&self) -> &'a str {
        self.kind
    }

    #[must_use]
    pub fn qualifier(&self) -> Option<&'a str> {
        self.qualifier
    }

    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// True when the qualifier starts with [`RESERVED_QUALIFIER_PREFIX`].
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.qualifier
            .is_some_and(|q| q.starts_with(RESERVED_QUALIFIER_PREFIX))
    }
}

impl fmt::Display for ComponentName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}
