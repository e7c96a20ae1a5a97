//! JSON export
//!
//! Serializes the schema read model with an appended `export_metadata` block.

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use leafvault_core::{DataVaultSchema, Result};

use crate::EXPORTER_VERSION;

#[derive(Debug, Default)]
pub struct JsonExporter;

impl JsonExporter {
    pub fn new() -> Self {
        Self
    }

    /// Schema read model plus export metadata, as a JSON value.
    pub fn to_value(&self, schema: &DataVaultSchema) -> serde_json::Value {
        let mut value = schema.to_value();
        value["export_metadata"] = serde_json::json!({
            "format": "json",
            "exported_at": Utc::now().to_rfc3339(),
            "exporter_version": EXPORTER_VERSION,
        });
        value
    }

    /// Write the schema as pretty-printed JSON.
    pub fn export(&self, schema: &DataVaultSchema, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.to_value(schema))?;
        write_file(path, &content)?;
        info!(path = %path.display(), "JSON export written");
        Ok(())
    }

    /// Write the schema as single-line JSON.
    pub fn export_compact(&self, schema: &DataVaultSchema, path: &Path) -> Result<()> {
        let content = serde_json::to_string(&self.to_value(schema))?;
        write_file(path, &content)?;
        info!(path = %path.display(), "compact JSON export written");
        Ok(())
    }
}

pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_schema;

    #[test]
    fn test_export_metadata_appended() {
        let value = JsonExporter::new().to_value(&sample_schema());
        assert_eq!(value["export_metadata"]["format"], "json");
        assert_eq!(value["export_metadata"]["exporter_version"], EXPORTER_VERSION);
        assert_eq!(value["hubs"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_export_writes_parseable_file_in_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/schema.json");
        JsonExporter::new().export(&sample_schema(), &path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["links"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_compact_export_is_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        JsonExporter::new()
            .export_compact(&sample_schema(), &path)
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
