//! RDF/Turtle export
//!
//! Hand-emitted Turtle: one resource per record under a configurable base
//! URI, `dvschema:` predicates, typed literals for scores and dates.

use std::fmt::Write as _;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use leafvault_core::{DataVaultSchema, Result};

use crate::json::write_file;

pub const DEFAULT_BASE_URI: &str = "http://www.example.org/datavault/";

#[derive(Debug)]
pub struct RdfExporter {
    base_uri: String,
}

impl Default for RdfExporter {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URI)
    }
}

impl RdfExporter {
    pub fn new(base_uri: &str) -> Self {
        let mut base_uri = base_uri.to_string();
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }
        Self { base_uri }
    }

    /// Build the full Turtle document for a schema.
    pub fn document(&self, schema: &DataVaultSchema) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "@prefix dv: <{}> .", self.base_uri);
        let _ = writeln!(out, "@prefix dvschema: <{}schema/> .", self.base_uri);
        let _ = writeln!(out, "@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .");

        for hub in &schema.hubs {
            let _ = writeln!(out);
            let _ = writeln!(out, "<{}hub/{}> a dvschema:Hub ;", self.base_uri, hub.hub_key);
            let _ = writeln!(out, "    dvschema:businessKey {} ;", literal(&hub.business_key));
            let _ = writeln!(
                out,
                "    dvschema:entityType {} ;",
                literal(hub.entity_type.as_str())
            );
            if !hub.ontology_uri.is_empty() {
                let _ = writeln!(out, "    dvschema:ontologyURI <{}> ;", hub.ontology_uri);
            }
            let _ = writeln!(
                out,
                "    dvschema:confidenceScore {} ;",
                float_literal(hub.confidence_score)
            );
            let _ = writeln!(out, "    dvschema:loadDate {} ;", date_literal(&hub.load_date));
            let _ = writeln!(
                out,
                "    dvschema:recordSource {} .",
                literal(&hub.record_source)
            );
        }

        for link in &schema.links {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "<{}link/{}> a dvschema:Link ;",
                self.base_uri, link.link_key
            );
            let _ = writeln!(
                out,
                "    dvschema:relationType {} ;",
                literal(&link.relation_type)
            );
            let _ = writeln!(
                out,
                "    dvschema:hubSource <{}hub/{}> ;",
                self.base_uri, link.hub_source_key
            );
            let _ = writeln!(
                out,
                "    dvschema:hubTarget <{}hub/{}> ;",
                self.base_uri, link.hub_target_key
            );
            let _ = writeln!(
                out,
                "    dvschema:confidenceScore {} ;",
                float_literal(link.confidence_score)
            );
            let _ = writeln!(out, "    dvschema:loadDate {} ;", date_literal(&link.load_date));
            let _ = writeln!(
                out,
                "    dvschema:recordSource {} .",
                literal(&link.record_source)
            );
        }

        for satellite in &schema.satellites {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "<{}satellite/{}> a dvschema:Satellite ;",
                self.base_uri, satellite.satellite_key
            );
            let _ = writeln!(
                out,
                "    dvschema:hubKey <{}hub/{}> ;",
                self.base_uri, satellite.hub_key
            );
            let _ = writeln!(
                out,
                "    dvschema:attributeName {} ;",
                literal(&satellite.attribute_name)
            );
            let _ = writeln!(
                out,
                "    dvschema:attributeValue {} ;",
                literal(&satellite.attribute_value)
            );
            let _ = writeln!(
                out,
                "    dvschema:confidenceScore {} ;",
                float_literal(satellite.confidence_score)
            );
            let _ = writeln!(
                out,
                "    dvschema:loadDate {} ;",
                date_literal(&satellite.load_date)
            );
            let _ = writeln!(
                out,
                "    dvschema:recordSource {} ;",
                literal(&satellite.record_source)
            );
            let _ = writeln!(out, "    dvschema:hashDiff {} .", literal(&satellite.hash_diff));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "<{}schema> a dvschema:DataVaultSchema ;", self.base_uri);
        let _ = writeln!(
            out,
            "    dvschema:exportedAt \"{}\"^^xsd:dateTime ;",
            Utc::now().to_rfc3339()
        );
        let _ = writeln!(
            out,
            "    dvschema:totalHubs \"{}\"^^xsd:integer ;",
            schema.hubs.len()
        );
        let _ = writeln!(
            out,
            "    dvschema:totalLinks \"{}\"^^xsd:integer ;",
            schema.links.len()
        );
        let _ = writeln!(
            out,
            "    dvschema:totalSatellites \"{}\"^^xsd:integer .",
            schema.satellites.len()
        );

        out
    }

    /// Write the Turtle document to a file.
    pub fn export(&self, schema: &DataVaultSchema, path: &Path) -> Result<()> {
        write_file(path, &self.document(schema))?;
        info!(path = %path.display(), "RDF export written");
        Ok(())
    }
}

fn literal(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn float_literal(value: f32) -> String {
    format!("\"{value:.4}\"^^xsd:float")
}

fn date_literal(date: &chrono::DateTime<Utc>) -> String {
    format!("\"{}\"^^xsd:dateTime", date.to_rfc3339())
}
