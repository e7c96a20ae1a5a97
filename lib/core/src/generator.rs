//! Data Vault schema generation, validation and merging
//!
//! Generation is pure assembly: it stamps metadata and wraps the classified
//! records into an immutable snapshot. Validation is a separate pass that
//! collects structured diagnostics and never fails - upstream model noise
//! means perfect structural soundness cannot be guaranteed, and a partially
//! imperfect schema is still worth exporting.

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::entity::{Hub, Link, Satellite};
use crate::schema::{DataVaultSchema, SchemaMetadata};
use ahash::AHashSet;
use chrono::Utc;

/// Version recorded in schema metadata
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Default)]
pub struct DataVaultGenerator;

/// First 8 chars of a key for diagnostic messages. Constructors always emit
/// 32 hex chars, but the key fields are public, so shorter keys must not
/// panic the validator.
fn key_prefix(key: &str) -> &str {
    key.get(..8).unwrap_or(key)
}

impl DataVaultGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Assemble classified records and run metadata into a schema snapshot.
    ///
    /// No validation happens here; call [`validate_schema`](Self::validate_schema)
    /// on the result.
    pub fn generate_schema(
        &self,
        hubs: Vec<Hub>,
        links: Vec<Link>,
        satellites: Vec<Satellite>,
        source_image: &str,
        lemmas: &[String],
    ) -> DataVaultSchema {
        DataVaultSchema {
            hubs,
            links,
            satellites,
            metadata: SchemaMetadata {
                generated_at: Utc::now(),
                source_image: Some(source_image.to_string()),
                original_lemmas: lemmas.to_vec(),
                lemma_count: lemmas.len(),
                generator_version: GENERATOR_VERSION.to_string(),
                merged_from: None,
                source_images: None,
            },
        }
    }

    /// Run all integrity checks and return the collected diagnostics.
    ///
    /// Four independent checks: key uniqueness, referential integrity,
    /// confidence bounds, structural cardinality. An empty result means the
    /// schema passed everything.
    pub fn validate_schema(&self, schema: &DataVaultSchema) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.check_key_uniqueness(schema, &mut diagnostics);
        self.check_referential_integrity(schema, &mut diagnostics);
        self.check_confidence_scores(schema, &mut diagnostics);
        self.check_structural_constraints(schema, &mut diagnostics);
        diagnostics
    }

    fn check_key_uniqueness(&self, schema: &DataVaultSchema, out: &mut Vec<Diagnostic>) {
        let hub_keys: AHashSet<&str> = schema.hubs.iter().map(|h| h.hub_key.as_str()).collect();
        if hub_keys.len() != schema.hubs.len() {
            out.push(Diagnostic::error(
                DiagnosticCode::DuplicateHubKey,
                "Duplicate hub keys detected",
            ));
        }

        let link_keys: AHashSet<&str> = schema.links.iter().map(|l| l.link_key.as_str()).collect();
        if link_keys.len() != schema.links.len() {
            out.push(Diagnostic::error(
                DiagnosticCode::DuplicateLinkKey,
                "Duplicate link keys detected",
            ));
        }

        let satellite_keys: AHashSet<&str> = schema
            .satellites
            .iter()
            .map(|s| s.satellite_key.as_str())
            .collect();
        if satellite_keys.len() != schema.satellites.len() {
            out.push(Diagnostic::error(
                DiagnosticCode::DuplicateSatelliteKey,
                "Duplicate satellite keys detected",
            ));
        }
    }

    fn check_referential_integrity(&self, schema: &DataVaultSchema, out: &mut Vec<Diagnostic>) {
        let valid_keys = schema.hub_keys();

        for link in &schema.links {
            if !valid_keys.contains(link.hub_source_key.as_str()) {
                out.push(Diagnostic::warning(
                    DiagnosticCode::DanglingLinkSource,
                    format!(
                        "Link {}... references an unknown source hub",
                        key_prefix(&link.link_key)
                    ),
                ));
            }
            if !valid_keys.contains(link.hub_target_key.as_str()) {
                out.push(Diagnostic::warning(
                    DiagnosticCode::DanglingLinkTarget,
                    format!(
                        "Link {}... references an unknown target hub",
                        key_prefix(&link.link_key)
                    ),
                ));
            }
        }

        for satellite in &schema.satellites {
            if !valid_keys.contains(satellite.hub_key.as_str()) {
                out.push(Diagnostic::warning(
                    DiagnosticCode::DanglingSatelliteHub,
                    format!(
                        "Satellite {}... references an unknown hub",
                        key_prefix(&satellite.satellite_key)
                    ),
                ));
            }
        }
    }

    fn check_confidence_scores(&self, schema: &DataVaultSchema, out: &mut Vec<Diagnostic>) {
        for hub in &schema.hubs {
            if !(0.0..=1.0).contains(&hub.confidence_score) {
                out.push(Diagnostic::warning(
                    DiagnosticCode::ConfidenceOutOfRange,
                    format!(
                        "Hub {} has an out-of-range confidence score: {}",
                        hub.business_key, hub.confidence_score
                    ),
                ));
            }
        }
        for link in &schema.links {
            if !(0.0..=1.0).contains(&link.confidence_score) {
                out.push(Diagnostic::warning(
                    DiagnosticCode::ConfidenceOutOfRange,
                    format!(
                        "Link {}... has an out-of-range confidence score: {}",
                        key_prefix(&link.link_key),
                        link.confidence_score
                    ),
                ));
            }
        }
        for satellite in &schema.satellites {
            if !(0.0..=1.0).contains(&satellite.confidence_score) {
                out.push(Diagnostic::warning(
                    DiagnosticCode::ConfidenceOutOfRange,
                    format!(
                        "Satellite {} has an out-of-range confidence score: {}",
                        satellite.attribute_name, satellite.confidence_score
                    ),
                ));
            }
        }
    }

    fn check_structural_constraints(&self, schema: &DataVaultSchema, out: &mut Vec<Diagnostic>) {
        let num_hubs = schema.hubs.len();
        let num_links = schema.links.len();

        if num_hubs == 0 {
            out.push(Diagnostic::warning(
                DiagnosticCode::NoHubs,
                "No hubs detected. At least one plant should be identified.",
            ));
        }

        // A link needs both endpoints present
        if num_links > 0 && num_hubs < 2 {
            out.push(Diagnostic::warning(
                DiagnosticCode::LinkWithoutEndpoints,
                format!(
                    "{} link(s) detected but only {} hub(s). A link requires 2 hubs.",
                    num_links, num_hubs
                ),
            ));
        }

        // At most one link per ordered hub pair; scan stops at the first duplicate
        if num_links > 1 {
            let mut seen_pairs: AHashSet<(&str, &str)> = AHashSet::new();
            for link in &schema.links {
                let pair = (link.hub_source_key.as_str(), link.hub_target_key.as_str());
                if !seen_pairs.insert(pair) {
                    out.push(Diagnostic::warning(
                        DiagnosticCode::DuplicateLinkPair,
                        "Duplicate links detected between the same hubs.",
                    ));
                    break;
                }
            }
        }
    }

    /// Merge several schemas into one.
    ///
    /// Hubs and links are deduplicated by key (first occurrence wins).
    /// Satellites are concatenated without deduplication: they are observation
    /// history, not a deduplicated set.
    pub fn merge_schemas(&self, schemas: Vec<DataVaultSchema>) -> DataVaultSchema {
        let mut merged_hubs = Vec::new();
        let mut merged_links = Vec::new();
        let mut merged_satellites = Vec::new();

        let mut seen_hub_keys: AHashSet<String> = AHashSet::new();
        let mut seen_link_keys: AHashSet<String> = AHashSet::new();

        let merged_from = schemas.len();
        let source_images: Vec<String> = schemas
            .iter()
            .map(|s| {
                s.metadata
                    .source_image
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string())
            })
            .collect();

        for schema in schemas {
            for hub in schema.hubs {
                if seen_hub_keys.insert(hub.hub_key.clone()) {
                    merged_hubs.push(hub);
                }
            }
            for link in schema.links {
                if seen_link_keys.insert(link.link_key.clone()) {
                    merged_links.push(link);
                }
            }
            merged_satellites.extend(schema.satellites);
        }

        DataVaultSchema {
            hubs: merged_hubs,
            links: merged_links,
            satellites: merged_satellites,
            metadata: SchemaMetadata {
                generated_at: Utc::now(),
                source_image: None,
                original_lemmas: Vec::new(),
                lemma_count: 0,
                generator_version: GENERATOR_VERSION.to_string(),
                merged_from: Some(merged_from),
                source_images: Some(source_images),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::entity::EntityType;

    fn generator() -> DataVaultGenerator {
        DataVaultGenerator::new()
    }

    fn plant_hub(source: &str) -> Hub {
        Hub::new("corn", EntityType::Plant, "http://example.org/ontology#corn", 1.0, source)
    }

    fn disease_hub(source: &str) -> Hub {
        Hub::new(
            "helminthosporiose",
            EntityType::Disease,
            "http://example.org/ontology#helminthosporiose",
            1.0,
            source,
        )
    }

    #[test]
    fn test_generate_schema_stamps_metadata() {
        let lemmas = vec!["corn".to_string(), "necrose".to_string()];
        let schema = generator().generate_schema(
            vec![plant_hub("img1.jpg")],
            vec![],
            vec![],
            "img1.jpg",
            &lemmas,
        );
        assert_eq!(schema.metadata.source_image.as_deref(), Some("img1.jpg"));
        assert_eq!(schema.metadata.lemma_count, 2);
        assert_eq!(schema.metadata.original_lemmas, lemmas);
        assert!(schema.metadata.merged_from.is_none());
    }

    #[test]
    fn test_valid_schema_has_no_diagnostics() {
        let plant = plant_hub("img1.jpg");
        let disease = disease_hub("img1.jpg");
        let link = Link::new(&plant.hub_key, &disease.hub_key, "has_disease", 1.0, "img1.jpg");
        let sat = Satellite::new(&disease.hub_key, "symptom", "necrose", 0.95, "img1.jpg");
        let schema = generator().generate_schema(
            vec![plant, disease],
            vec![link],
            vec![sat],
            "img1.jpg",
            &[],
        );
        assert!(generator().validate_schema(&schema).is_empty());
    }

    #[test]
    fn test_duplicate_hub_keys_are_errors() {
        let schema = generator().generate_schema(
            vec![plant_hub("img1.jpg"), plant_hub("img2.jpg")],
            vec![],
            vec![],
            "img1.jpg",
            &[],
        );
        let diagnostics = generator().validate_schema(&schema);
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::DuplicateHubKey && d.is_error()));
    }

    #[test]
    fn test_dangling_link_target_is_warning_and_schema_stays_exportable() {
        let plant = plant_hub("img1.jpg");
        let link = Link::new(&plant.hub_key, "feedfacefeedfacefeedfacefeedface", "has_disease", 1.0, "img1.jpg");
        let schema = generator().generate_schema(vec![plant], vec![link], vec![], "img1.jpg", &[]);

        let diagnostics = generator().validate_schema(&schema);
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::DanglingLinkTarget && d.severity == Severity::Warning));

        // Still constructible and exportable despite the warning
        let value = schema.to_value();
        assert_eq!(value["links"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_hand_built_short_keys_do_not_break_validation() {
        let plant = plant_hub("img1.jpg");
        let mut link = Link::new(&plant.hub_key, "missing", "has_disease", 1.0, "img1.jpg");
        link.link_key = "abc".to_string();
        let mut sat = Satellite::new("missing", "symptom", "necrose", 0.95, "img1.jpg");
        sat.satellite_key = "s".to_string();
        let schema =
            generator().generate_schema(vec![plant], vec![link], vec![sat], "img1.jpg", &[]);

        let diagnostics = generator().validate_schema(&schema);
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::DanglingLinkTarget));
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::DanglingSatelliteHub));
    }

    #[test]
    fn test_out_of_range_confidence_is_warning() {
        let mut hub = plant_hub("img1.jpg");
        hub.confidence_score = 1.5;
        let schema = generator().generate_schema(vec![hub], vec![], vec![], "img1.jpg", &[]);
        let diagnostics = generator().validate_schema(&schema);
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::ConfidenceOutOfRange));
    }

    #[test]
    fn test_empty_schema_warns_about_missing_hubs() {
        let schema = generator().generate_schema(vec![], vec![], vec![], "img1.jpg", &[]);
        let diagnostics = generator().validate_schema(&schema);
        assert!(diagnostics.iter().any(|d| d.code == DiagnosticCode::NoHubs));
    }

    #[test]
    fn test_duplicate_link_pair_reported_once() {
        let plant = plant_hub("img1.jpg");
        let disease = disease_hub("img1.jpg");
        let a = Link::new(&plant.hub_key, &disease.hub_key, "has_disease", 1.0, "img1.jpg");
        let b = Link::new(&plant.hub_key, &disease.hub_key, "has_infestation", 1.0, "img1.jpg");
        let c = Link::new(&plant.hub_key, &disease.hub_key, "has_health_status", 1.0, "img1.jpg");
        let schema = generator().generate_schema(
            vec![plant, disease],
            vec![a, b, c],
            vec![],
            "img1.jpg",
            &[],
        );
        let diagnostics = generator().validate_schema(&schema);
        let dup_pairs = diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::DuplicateLinkPair)
            .count();
        // Scan stops at the first duplicate pair found
        assert_eq!(dup_pairs, 1);
    }

    #[test]
    fn test_merge_dedups_hubs_but_keeps_all_satellites() {
        let gen = generator();
        let hub1 = plant_hub("img1.jpg");
        let sat1 = Satellite::new(&hub1.hub_key, "color", "vert_fonce", 0.95, "img1.jpg");
        let schema1 = gen.generate_schema(vec![hub1], vec![], vec![sat1], "img1.jpg", &[]);

        let hub2 = plant_hub("img2.jpg");
        let sat2 = Satellite::new(&hub2.hub_key, "leaf_state", "saine", 0.95, "img2.jpg");
        let schema2 = gen.generate_schema(vec![hub2], vec![], vec![sat2], "img2.jpg", &[]);

        let merged = gen.merge_schemas(vec![schema1, schema2]);
        assert_eq!(merged.hubs.len(), 1);
        assert_eq!(merged.satellites.len(), 2);
        assert_eq!(merged.metadata.merged_from, Some(2));
        assert_eq!(
            merged.metadata.source_images.as_deref().unwrap(),
            ["img1.jpg".to_string(), "img2.jpg".to_string()]
        );
    }
}
