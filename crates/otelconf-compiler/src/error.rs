//! Compilation error taxonomy.
//!
//! Every failure is fatal to the current compilation. Messages name the
//! offending identifiers and their wording is stable: operators and tests
//! match on it.

use otelconf_types::ComponentCategory;

/// Errors raised while compiling properties into a collector configuration.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Both the `config` property and a legacy exporter property were supplied.
    #[error(
        "Cannot provide both `config` and the legacy `metric_exporters`/`trace_exporters` properties"
    )]
    ConflictingConfiguration,

    /// A property could not be parsed or has the wrong shape.
    #[error("Invalid `{property}` property: {reason}")]
    MalformedProperty {
        property: &'static str,
        reason: String,
    },

    #[error("Exporter configuration must be provided")]
    ExporterConfigurationRequired,

    #[error("Service configuration must be provided")]
    ServiceConfigurationRequired,

    /// An operator-supplied component used the `cf-internal-` qualifier.
    #[error("{} cannot be defined under cf-internal namespace", .category.title())]
    ReservedNamespaceViolation { category: ComponentCategory },

    /// Configured component types that the build manifest does not provide.
    #[error(
        "The following {category} are not included in this distribution: {}. Available {category}: {}",
        quoted_list(.unsupported),
        quoted_list(.available)
    )]
    UnsupportedComponent {
        category: ComponentCategory,
        unsupported: Vec<String>,
        available: Vec<String>,
    },

    /// Configured component types excluded by a non-empty allow-list.
    #[error(
        "The following {category} are not permitted by allow_list.{category}: {}",
        quoted_list(.disallowed)
    )]
    DisallowedComponent {
        category: ComponentCategory,
        disallowed: Vec<String>,
    },

    /// Allow-list entries naming types the build manifest does not provide.
    #[error(
        "allow_list.{category} names components not included in this distribution: {}. Available {category}: {}",
        quoted_list(.entries),
        quoted_list(.available)
    )]
    UnrecognizedAllowListEntry {
        category: ComponentCategory,
        entries: Vec<String>,
        available: Vec<String>,
    },

    /// A prometheus exporter bound to the port of the internal metrics endpoint.
    #[error("Cannot define prometheus exporter listening on port {port} ({exporter})")]
    ReservedPortConflict { exporter: String, port: u16 },

    #[error(
        "Exporter names must be unique across metric_exporters and trace_exporters, found duplicates: {}",
        quoted_list(.names)
    )]
    DuplicateExporterName { names: Vec<String> },

    /// Placeholders, verbatim and in encounter order, that resolved to no value.
    #[error("Missing secrets for placeholders: {}", .placeholders.join(", "))]
    MissingSecrets { placeholders: Vec<String> },

    /// Supplied `name.key` secrets never referenced by a placeholder.
    #[error("Unused secrets: {}", .secrets.join(", "))]
    UnusedSecrets { secrets: Vec<String> },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to serialize configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Render `["a", "b"]` as `"a", "b"`.
pub(crate) fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
