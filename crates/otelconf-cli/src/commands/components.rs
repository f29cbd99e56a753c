use anyhow::Result;
use otelconf_types::{ComponentCategory, ComponentRegistry, ComponentSet};

use super::ManifestArgs;

/// Execute the `components` command: list resolved component types per category.
pub fn execute(manifest: &ManifestArgs, json: bool) -> Result<()> {
    let registry = manifest.load_registry()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing(&registry))?);
        return Ok(());
    }

    for category in ComponentCategory::ALL {
        let available = registry.available(category);
        if available.is_empty() {
            continue;
        }
        println!("{}:", category.title());
        for kind in available {
            println!("  {kind}");
        }
    }
    Ok(())
}

fn listing(registry: &ComponentSet) -> serde_json::Value {
    let map = ComponentCategory::ALL
        .into_iter()
        .map(|category| {
            let kinds = registry
                .available(category)
                .iter()
                .cloned()
                .map(serde_json::Value::String)
                .collect();
            (category.as_str().to_string(), serde_json::Value::Array(kinds))
        })
        .collect();
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_has_every_category() {
        let registry = ComponentSet::new()
            .with(ComponentCategory::Processors, ["batch"])
            .with(ComponentCategory::Exporters, ["otlp", "debug"]);
        let value = listing(&registry);
        assert_eq!(value["processors"], serde_json::json!(["batch"]));
        assert_eq!(value["exporters"], serde_json::json!(["debug", "otlp"]));
        assert_eq!(value["receivers"], serde_json::json!([]));
        assert_eq!(value["connectors"], serde_json::json!([]));
    }

    #[test]
    fn test_execute_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("builder-config.yaml");
        std::fs::write(
            &manifest,
            "exporters:\n  - gomod: example.com/acme/exporter/weirdexporter v1.0.0\n",
        )
        .unwrap();
        let overrides = dir.path().join("overrides.yaml");
        std::fs::write(&overrides, "example.com/acme/exporter/weirdexporter: acme\n").unwrap();

        let args = ManifestArgs {
            manifest,
            type_overrides: Some(overrides),
        };
        let registry = args.load_registry().unwrap();
        assert!(registry.contains(ComponentCategory::Exporters, "acme"));
        execute(&args, true).unwrap();
    }
}
