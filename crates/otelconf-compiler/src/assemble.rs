//! Pipeline assembly: legacy pipeline derivation, builtin receiver
//! injection and internal telemetry settings.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::document::{scalar_to_string, ConfigDocument};
use crate::error::{CompileError, Result};
use crate::normalize::LegacyExporters;
use crate::properties::{IngressProperties, TelemetryProperties};

/// The only receiver ever wired into a pipeline.
pub const BUILTIN_RECEIVER_NAME: &str = "otlp/cf-internal-local";

const TLS_MIN_VERSION: &str = "1.3";

// ── Builtin receiver ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TlsSettings {
    client_ca_file: PathBuf,
    cert_file: PathBuf,
    key_file: PathBuf,
    min_version: &'static str,
}

#[derive(Debug, Serialize)]
struct GrpcProtocol {
    endpoint: String,
    tls: TlsSettings,
}

#[derive(Debug, Serialize)]
struct Protocols {
    grpc: GrpcProtocol,
}

#[derive(Debug, Serialize)]
struct OtlpReceiver {
    protocols: Protocols,
}

/// Settings the assembler needs beyond the document itself.
#[derive(Debug, Clone)]
pub struct AssemblySettings<'a> {
    /// Deployment config directory holding `certs/`.
    pub config_dir: &'a Path,
    pub ingress: &'a IngressProperties,
    pub telemetry: &'a TelemetryProperties,
}

/// Definition of the builtin TLS-secured OTLP gRPC receiver.
///
/// # Errors
///
/// Returns an error if the definition cannot be converted to YAML.
pub fn builtin_receiver(endpoint: String, config_dir: &Path) -> Result<Value> {
    let certs = config_dir.join("certs");
    let receiver = OtlpReceiver {
        protocols: Protocols {
            grpc: GrpcProtocol {
                endpoint,
                tls: TlsSettings {
                    client_ca_file: certs.join("otel-collector-ca.crt"),
                    cert_file: certs.join("otel-collector.crt"),
                    key_file: certs.join("otel-collector.key"),
                    min_version: TLS_MIN_VERSION,
                },
            },
        },
    };
    Ok(serde_yaml::to_value(receiver)?)
}

// ── Legacy shorthand ────────────────────────────────────────────────

fn receivers_list() -> Value {
    Value::Sequence(vec![Value::from(BUILTIN_RECEIVER_NAME)])
}

fn exporter_pipeline(exporters: &Mapping) -> Value {
    let mut pipeline = Mapping::new();
    pipeline.insert("receivers".into(), receivers_list());
    pipeline.insert(
        "exporters".into(),
        Value::Sequence(exporters.keys().cloned().collect()),
    );
    Value::Mapping(pipeline)
}

/// Build a document from the legacy per-signal exporter maps.
///
/// A pipeline is only emitted for a non-empty map.
///
/// # Errors
///
/// Returns [`CompileError::DuplicateExporterName`] if both maps define an
/// exporter with the same name.
pub fn from_legacy(legacy: LegacyExporters) -> Result<ConfigDocument> {
    let duplicates: Vec<String> = legacy
        .metric
        .keys()
        .filter(|name| legacy.trace.contains_key(*name))
        .map(scalar_to_string)
        .collect();
    if !duplicates.is_empty() {
        return Err(CompileError::DuplicateExporterName { names: duplicates });
    }

    let mut pipelines = Mapping::new();
    if !legacy.metric.is_empty() {
        pipelines.insert("metrics".into(), exporter_pipeline(&legacy.metric));
    }
    if !legacy.trace.is_empty() {
        pipelines.insert("traces".into(), exporter_pipeline(&legacy.trace));
    }
    tracing::debug!(pipelines = pipelines.len(), "Derived pipelines from legacy exporters");

    let mut exporters = legacy.metric;
    exporters.extend(legacy.trace);

    let mut service = Mapping::new();
    service.insert("pipelines".into(), Value::Mapping(pipelines));

    Ok(ConfigDocument {
        exporters: Some(exporters),
        service: Some(service),
        ..ConfigDocument::default()
    })
}

// ── Finalisation ────────────────────────────────────────────────────

/// Child mapping under `key`, replacing a missing or non-mapping value.
fn child_mapping<'m>(parent: &'m mut Mapping, key: &str) -> &'m mut Mapping {
    if !parent.get(key).is_some_and(Value::is_mapping) {
        parent.insert(key.into(), Value::Mapping(Mapping::new()));
    }
    match parent.get_mut(key) {
        Some(Value::Mapping(m)) => m,
        _ => unreachable!("{key} was just set to a mapping"),
    }
}

/// Inject the builtin receiver, rewire every pipeline to it and attach
/// internal telemetry settings.
///
/// Operator-supplied receivers are dropped.
///
/// # Errors
///
/// Returns an error if the builtin receiver cannot be built.
pub fn finalize(document: &mut ConfigDocument, settings: &AssemblySettings<'_>) -> Result<()> {
    let mut receivers = Mapping::new();
    receivers.insert(
        BUILTIN_RECEIVER_NAME.into(),
        builtin_receiver(settings.ingress.grpc_endpoint(), settings.config_dir)?,
    );
    if let Some(dropped) = document.receivers.as_ref().filter(|r| !r.is_empty()) {
        tracing::debug!(
            receivers = ?dropped.keys().map(scalar_to_string).collect::<Vec<_>>(),
            "Dropping operator-supplied receivers"
        );
    }
    document.receivers = Some(receivers);

    if let Some(pipelines) = document.pipelines_mut() {
        for pipeline in pipelines.values_mut() {
            if !pipeline.is_mapping() {
                *pipeline = Value::Mapping(Mapping::new());
            }
            if let Value::Mapping(p) = pipeline {
                p.insert("receivers".into(), receivers_list());
            }
        }
    }

    let service = document.service.get_or_insert_with(Mapping::new);
    let metrics = child_mapping(child_mapping(service, "telemetry"), "metrics");
    metrics.insert(
        "address".into(),
        Value::from(settings.telemetry.metrics_address()),
    );
    metrics.insert(
        "level".into(),
        Value::from(settings.telemetry.metrics_level()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> ConfigDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn finalize_default(d: &mut ConfigDocument) {
        let ingress = IngressProperties::default();
        let telemetry = TelemetryProperties::default();
        finalize(
            d,
            &AssemblySettings {
                config_dir: Path::new("/var/vcap/jobs/otel-collector/config"),
                ingress: &ingress,
                telemetry: &telemetry,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_builtin_receiver_shape() {
        let receiver =
            builtin_receiver("127.0.0.1:9100".into(), Path::new("/var/vcap/jobs/x/config")).unwrap();
        let expected: Value = serde_yaml::from_str(
            r#"
protocols:
  grpc:
    endpoint: 127.0.0.1:9100
    tls:
      client_ca_file: /var/vcap/jobs/x/config/certs/otel-collector-ca.crt
      cert_file: /var/vcap/jobs/x/config/certs/otel-collector.crt
      key_file: /var/vcap/jobs/x/config/certs/otel-collector.key
      min_version: "1.3"
"#,
        )
        .unwrap();
        assert_eq!(receiver, expected);
    }

    #[test]
    fn test_legacy_builds_pipelines_per_signal() {
        let document = from_legacy(LegacyExporters {
            metric: mapping("otlp/metrics: {endpoint: 'a:4317'}\nfile: {path: /tmp/m}\n"),
            trace: mapping("otlp/traces: {endpoint: 'b:4317'}\n"),
        })
        .unwrap();
        let pipelines = document.pipelines().unwrap();
        let metrics: Vec<&str> = pipelines["metrics"]["exporters"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(metrics, vec!["otlp/metrics", "file"]);
        assert_eq!(pipelines["traces"]["exporters"][0].as_str(), Some("otlp/traces"));
        let exporter_names: Vec<String> = document
            .exporters
            .unwrap()
            .keys()
            .map(scalar_to_string)
            .collect();
        assert_eq!(exporter_names, vec!["otlp/metrics", "file", "otlp/traces"]);
    }

    #[test]
    fn test_legacy_skips_empty_signal() {
        let document = from_legacy(LegacyExporters {
            metric: Mapping::new(),
            trace: mapping("otlp/traces: {endpoint: 'b:4317'}\n"),
        })
        .unwrap();
        let pipelines = document.pipelines().unwrap();
        assert!(!pipelines.contains_key("metrics"));
        assert_eq!(pipelines["traces"]["exporters"].as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn test_legacy_both_empty_has_no_pipelines() {
        let document = from_legacy(LegacyExporters::default()).unwrap();
        assert!(document.pipelines().unwrap().is_empty());
        assert!(document.exporters.unwrap().is_empty());
    }

    #[test]
    fn test_legacy_duplicate_names() {
        let err = from_legacy(LegacyExporters {
            metric: mapping("otlp: {}\ndebug: {}\n"),
            trace: mapping("debug: {}\notlp: {}\n"),
        })
        .unwrap_err();
        let CompileError::DuplicateExporterName { names } = err else {
            panic!("expected DuplicateExporterName");
        };
        assert_eq!(names, vec!["otlp", "debug"]);
    }

    #[test]
    fn test_finalize_replaces_receivers_everywhere() {
        let mut d = doc(
            r"
receivers:
  otlp/placeholder: ~
  otlp/cf-internal-local: {protocols: {http: {}}}
exporters:
  otlp: {}
service:
  pipelines:
    traces:
      receivers: [otlp/placeholder]
      exporters: [otlp]
    traces/2:
      receivers: [otlp/placeholder, otlp/cf-internal-local]
      exporters: [otlp]
    metrics/foo: ~
",
        );
        finalize_default(&mut d);
        let receivers = d.receivers.as_ref().unwrap();
        assert_eq!(receivers.len(), 1);
        assert!(receivers[BUILTIN_RECEIVER_NAME]["protocols"]["grpc"].is_mapping());
        for pipeline in d.pipelines().unwrap().values() {
            assert_eq!(pipeline["receivers"], receivers_list());
        }
    }

    #[test]
    fn test_finalize_preserves_pipeline_key_position() {
        let mut d = doc(
            "exporters: {}\nservice:\n  pipelines:\n    traces:\n      receivers: [x]\n      exporters: [otlp]\n",
        );
        finalize_default(&mut d);
        let keys: Vec<String> = d.pipelines().unwrap()["traces"]
            .as_mapping()
            .unwrap()
            .keys()
            .map(scalar_to_string)
            .collect();
        assert_eq!(keys, vec!["receivers", "exporters"]);
    }

    #[test]
    fn test_finalize_telemetry_defaults_and_merge() {
        let mut d = doc(
            "exporters: {}\nservice:\n  telemetry:\n    logs: {level: debug}\n    metrics: {level: none}\n",
        );
        finalize_default(&mut d);
        let telemetry = &d.service.as_ref().unwrap()["telemetry"];
        assert_eq!(telemetry["metrics"]["address"].as_str(), Some("127.0.0.1:14830"));
        assert_eq!(telemetry["metrics"]["level"].as_str(), Some("basic"));
        assert_eq!(telemetry["logs"]["level"].as_str(), Some("debug"));
    }

    #[test]
    fn test_finalize_uses_property_overrides() {
        let mut d = doc("exporters: {}\nservice: {}\n");
        let ingress: IngressProperties =
            serde_yaml::from_str("grpc: {port: 1234, address: 0.0.0.0}").unwrap();
        let telemetry: TelemetryProperties =
            serde_yaml::from_str("metrics: {port: 14831, level: detailed}").unwrap();
        finalize(
            &mut d,
            &AssemblySettings {
                config_dir: Path::new("/cfg"),
                ingress: &ingress,
                telemetry: &telemetry,
            },
        )
        .unwrap();
        let receiver = &d.receivers.as_ref().unwrap()[BUILTIN_RECEIVER_NAME];
        assert_eq!(
            receiver["protocols"]["grpc"]["endpoint"].as_str(),
            Some("0.0.0.0:1234")
        );
        let metrics = &d.service.as_ref().unwrap()["telemetry"]["metrics"];
        assert_eq!(metrics["address"].as_str(), Some("127.0.0.1:14831"));
        assert_eq!(metrics["level"].as_str(), Some("detailed"));
    }
}
