//! SQL export (PostgreSQL dialect)
//!
//! Emits a self-contained script: table creation, one INSERT per record and
//! index creation. Key columns are `VARCHAR(32)` to match the entity key
//! width; confidence columns carry a `[0, 1]` CHECK constraint.

use std::fmt::Write as _;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use leafvault_core::{DataVaultSchema, Result};

use crate::json::write_file;

#[derive(Debug, Default)]
pub struct SqlExporter;

const CREATE_TABLES: &str = "\
-- ============================================================
-- CREATE TABLES
-- ============================================================

CREATE TABLE IF NOT EXISTS dv_hubs (
    hub_key VARCHAR(32) PRIMARY KEY,
    business_key VARCHAR(255) NOT NULL,
    entity_type VARCHAR(100) NOT NULL,
    ontology_uri TEXT,
    confidence_score NUMERIC(5, 4) CHECK (confidence_score >= 0 AND confidence_score <= 1),
    load_date TIMESTAMP NOT NULL,
    record_source VARCHAR(255) NOT NULL,
    UNIQUE(business_key, entity_type)
);

CREATE TABLE IF NOT EXISTS dv_links (
    link_key VARCHAR(32) PRIMARY KEY,
    hub_source_key VARCHAR(32) NOT NULL REFERENCES dv_hubs(hub_key),
    hub_target_key VARCHAR(32) NOT NULL REFERENCES dv_hubs(hub_key),
    relation_type VARCHAR(255) NOT NULL,
    confidence_score NUMERIC(5, 4) CHECK (confidence_score >= 0 AND confidence_score <= 1),
    load_date TIMESTAMP NOT NULL,
    record_source VARCHAR(255) NOT NULL
);

CREATE TABLE IF NOT EXISTS dv_satellites (
    satellite_key VARCHAR(32) PRIMARY KEY,
    hub_key VARCHAR(32) NOT NULL REFERENCES dv_hubs(hub_key),
    attribute_name VARCHAR(255) NOT NULL,
    attribute_value TEXT NOT NULL,
    confidence_score NUMERIC(5, 4) CHECK (confidence_score >= 0 AND confidence_score <= 1),
    load_date TIMESTAMP NOT NULL,
    record_source VARCHAR(255) NOT NULL,
    hash_diff VARCHAR(32) NOT NULL
);";

const CREATE_INDEXES: &str = "\
-- ============================================================
-- CREATE INDEXES
-- ============================================================

CREATE INDEX IF NOT EXISTS idx_hubs_business_key ON dv_hubs(business_key);
CREATE INDEX IF NOT EXISTS idx_hubs_entity_type ON dv_hubs(entity_type);
CREATE INDEX IF NOT EXISTS idx_hubs_load_date ON dv_hubs(load_date);

CREATE INDEX IF NOT EXISTS idx_links_source ON dv_links(hub_source_key);
CREATE INDEX IF NOT EXISTS idx_links_target ON dv_links(hub_target_key);
CREATE INDEX IF NOT EXISTS idx_links_relation ON dv_links(relation_type);
CREATE INDEX IF NOT EXISTS idx_links_load_date ON dv_links(load_date);

CREATE INDEX IF NOT EXISTS idx_satellites_hub ON dv_satellites(hub_key);
CREATE INDEX IF NOT EXISTS idx_satellites_attribute ON dv_satellites(attribute_name);
CREATE INDEX IF NOT EXISTS idx_satellites_load_date ON dv_satellites(load_date);
CREATE INDEX IF NOT EXISTS idx_satellites_hash_diff ON dv_satellites(hash_diff);";

impl SqlExporter {
    pub fn new() -> Self {
        Self
    }

    /// Build the full SQL script for a schema.
    pub fn script(&self, schema: &DataVaultSchema) -> String {
        let mut sections = vec![self.header(schema), CREATE_TABLES.to_string()];
        sections.push(self.hub_inserts(schema));
        sections.push(self.link_inserts(schema));
        sections.push(self.satellite_inserts(schema));
        sections.push(CREATE_INDEXES.to_string());
        sections.join("\n\n")
    }

    /// Write the SQL script to a file.
    pub fn export(&self, schema: &DataVaultSchema, path: &Path) -> Result<()> {
        write_file(path, &self.script(schema))?;
        info!(path = %path.display(), "SQL export written");
        Ok(())
    }

    fn header(&self, schema: &DataVaultSchema) -> String {
        let source = schema
            .metadata
            .source_image
            .as_deref()
            .unwrap_or("unknown");
        format!(
            "-- Data Vault Schema Export\n\
             -- Generated at: {}\n\
             -- Source: {}\n\
             -- Statistics: {} Hubs, {} Links, {} Satellites\n\
             -- Database: PostgreSQL",
            Utc::now().to_rfc3339(),
            source,
            schema.hubs.len(),
            schema.links.len(),
            schema.satellites.len(),
        )
    }

    fn hub_inserts(&self, schema: &DataVaultSchema) -> String {
        if schema.hubs.is_empty() {
            return "-- No Hubs to insert".to_string();
        }
        let mut out = section_banner("INSERT HUBS");
        for hub in &schema.hubs {
            let _ = writeln!(
                out,
                "INSERT INTO dv_hubs (hub_key, business_key, entity_type, ontology_uri, confidence_score, load_date, record_source)\n\
                 VALUES ('{}', '{}', '{}', '{}', {:.4}, '{}', '{}');",
                hub.hub_key,
                escape(&hub.business_key),
                hub.entity_type,
                escape(&hub.ontology_uri),
                hub.confidence_score,
                hub.load_date.to_rfc3339(),
                escape(&hub.record_source),
            );
        }
        out
    }

    fn link_inserts(&self, schema: &DataVaultSchema) -> String {
        if schema.links.is_empty() {
            return "-- No Links to insert".to_string();
        }
        let mut out = section_banner("INSERT LINKS");
        for link in &schema.links {
            let _ = writeln!(
                out,
                "INSERT INTO dv_links (link_key, hub_source_key, hub_target_key, relation_type, confidence_score, load_date, record_source)\n\
                 VALUES ('{}', '{}', '{}', '{}', {:.4}, '{}', '{}');",
                link.link_key,
                link.hub_source_key,
                link.hub_target_key,
                escape(&link.relation_type),
                link.confidence_score,
                link.load_date.to_rfc3339(),
                escape(&link.record_source),
            );
        }
        out
    }

    fn satellite_inserts(&self, schema: &DataVaultSchema) -> String {
        if schema.satellites.is_empty() {
            return "-- No Satellites to insert".to_string();
        }
        let mut out = section_banner("INSERT SATELLITES");
        for satellite in &schema.satellites {
            let _ = writeln!(
                out,
                "INSERT INTO dv_satellites (satellite_key, hub_key, attribute_name, attribute_value, confidence_score, load_date, record_source, hash_diff)\n\
                 VALUES ('{}', '{}', '{}', '{}', {:.4}, '{}', '{}', '{}');",
                satellite.satellite_key,
                satellite.hub_key,
                escape(&satellite.attribute_name),
                escape(&satellite.attribute_value),
                satellite.confidence_score,
                satellite.load_date.to_rfc3339(),
                escape(&satellite.record_source),
                satellite.hash_diff,
            );
        }
        out
    }
}

fn section_banner(title: &str) -> String {
    format!(
        "-- ============================================================\n\
         -- {title}\n\
         -- ============================================================\n"
    )
}

fn escape(value: &str) -> String {
    value.replace('\'', "''")
}
