//! Data Vault schema aggregate
//!
//! An immutable-after-construction snapshot of one classification pass: the
//! hub/link/satellite lists plus run metadata. All cross-entity references are
//! by key, so entities can be serialized independently.

use crate::entity::{Hub, Link, Satellite};
use ahash::AHashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Run metadata stamped onto a schema at generation time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaMetadata {
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
    pub original_lemmas: Vec<String>,
    pub lemma_count: usize,
    pub generator_version: String,
    /// Number of schemas this one was merged from, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_from: Option<usize>,
    /// Source images that contributed to a merged schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_images: Option<Vec<String>>,
}

/// One classification pass assembled into Data Vault form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataVaultSchema {
    pub hubs: Vec<Hub>,
    pub links: Vec<Link>,
    pub satellites: Vec<Satellite>,
    pub metadata: SchemaMetadata,
}

impl DataVaultSchema {
    /// Set of hub keys present in this schema, for referential checks.
    pub fn hub_keys(&self) -> AHashSet<&str> {
        self.hubs.iter().map(|h| h.hub_key.as_str()).collect()
    }

    /// Nested export read model: metadata plus per-kind record lists.
    ///
    /// Record field names, ISO-8601 load dates and 4-decimal confidence
    /// rounding are the compatibility surface consumed by all exporters.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "metadata": serde_json::to_value(&self.metadata).unwrap_or_default(),
            "hubs": self.hubs.iter().map(Hub::to_record).collect::<Vec<_>>(),
            "links": self.links.iter().map(Link::to_record).collect::<Vec<_>>(),
            "satellites": self.satellites.iter().map(Satellite::to_record).collect::<Vec<_>>(),
        })
    }

    /// Aggregate counts and average confidence, computed on demand.
    pub fn statistics(&self) -> SchemaStatistics {
        let mut entity_types: HashMap<String, usize> = HashMap::new();
        for hub in &self.hubs {
            *entity_types.entry(hub.entity_type.as_str().to_string()).or_insert(0) += 1;
        }

        let mut relation_types: HashMap<String, usize> = HashMap::new();
        for link in &self.links {
            *relation_types.entry(link.relation_type.clone()).or_insert(0) += 1;
        }

        let mut attribute_names: HashMap<String, usize> = HashMap::new();
        for satellite in &self.satellites {
            *attribute_names.entry(satellite.attribute_name.clone()).or_insert(0) += 1;
        }

        SchemaStatistics {
            total_hubs: self.hubs.len(),
            total_links: self.links.len(),
            total_satellites: self.satellites.len(),
            entity_types,
            relation_types,
            attribute_names,
            average_confidence: AverageConfidence {
                hubs: average(self.hubs.iter().map(|h| h.confidence_score)),
                links: average(self.links.iter().map(|l| l.confidence_score)),
                satellites: average(self.satellites.iter().map(|s| s.confidence_score)),
            },
        }
    }
}

/// Mean confidence per entity kind, rounded to 3 decimals (0.0 when empty)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AverageConfidence {
    pub hubs: f64,
    pub links: f64,
    pub satellites: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaStatistics {
    pub total_hubs: usize,
    pub total_links: usize,
    pub total_satellites: usize,
    pub entity_types: HashMap<String, usize>,
    pub relation_types: HashMap<String, usize>,
    pub attribute_names: HashMap<String, usize>,
    pub average_confidence: AverageConfidence,
}

fn average(scores: impl Iterator<Item = f32>) -> f64 {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for score in scores {
        sum += f64::from(score);
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        (sum / count as f64 * 1_000.0).round() / 1_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;

    fn sample_schema() -> DataVaultSchema {
        let plant = Hub::new("corn", EntityType::Plant, "http://example.org/ontology#corn", 1.0, "img1.jpg");
        let disease = Hub::new("rouille", EntityType::Disease, "http://example.org/ontology#rouille", 0.9, "img1.jpg");
        let link = Link::new(&plant.hub_key, &disease.hub_key, "has_disease", 1.0, "img1.jpg");
        let sat = Satellite::new(&plant.hub_key, "color", "vert_fonce", 0.95, "img1.jpg");
        DataVaultSchema {
            hubs: vec![plant, disease],
            links: vec![link],
            satellites: vec![sat],
            metadata: SchemaMetadata {
                generated_at: Utc::now(),
                source_image: Some("img1.jpg".to_string()),
                original_lemmas: vec!["corn".to_string(), "rouille".to_string()],
                lemma_count: 2,
                generator_version: "0.1.0".to_string(),
                merged_from: None,
                source_images: None,
            },
        }
    }

    #[test]
    fn test_statistics_counts_and_groups() {
        let stats = sample_schema().statistics();
        assert_eq!(stats.total_hubs, 2);
        assert_eq!(stats.total_links, 1);
        assert_eq!(stats.total_satellites, 1);
        assert_eq!(stats.entity_types["plant"], 1);
        assert_eq!(stats.entity_types["disease"], 1);
        assert_eq!(stats.relation_types["has_disease"], 1);
        assert_eq!(stats.attribute_names["color"], 1);
        assert!((stats.average_confidence.hubs - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_empty_schema_averages_zero() {
        let mut schema = sample_schema();
        schema.hubs.clear();
        schema.links.clear();
        schema.satellites.clear();
        let stats = schema.statistics();
        assert_eq!(stats.average_confidence.hubs, 0.0);
        assert_eq!(stats.average_confidence.links, 0.0);
    }

    #[test]
    fn test_to_value_round_trip_counts() {
        let schema = sample_schema();
        let value = schema.to_value();
        assert_eq!(value["hubs"].as_array().unwrap().len(), 2);
        assert_eq!(value["links"].as_array().unwrap().len(), 1);
        assert_eq!(value["satellites"].as_array().unwrap().len(), 1);
        assert_eq!(value["metadata"]["lemma_count"].as_u64().unwrap(), 2);
        // Confidence survives with the documented 4-decimal rounding
        assert_eq!(value["hubs"][1]["confidence_score"].as_f64().unwrap(), 0.9);
    }
}
