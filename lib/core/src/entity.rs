//! Data Vault entity records
//!
//! Hubs (business entities), Links (typed relations between hubs) and
//! Satellites (descriptive attributes attached to one hub). All records are
//! value-like: created once, never mutated, identified by content-derived keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Width of entity keys in hex characters. Matches the `VARCHAR(32)` columns
/// of the SQL export surface.
pub const KEY_WIDTH: usize = 32;

/// Derive a deterministic entity key from a content string.
///
/// SHA-256, hex-encoded, truncated to [`KEY_WIDTH`] characters.
pub fn derive_key(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut key = String::with_capacity(KEY_WIDTH);
    for byte in digest.iter().take(KEY_WIDTH / 2) {
        key.push_str(&format!("{:02x}", byte));
    }
    key
}

/// Round a confidence score to the 4 decimal places of the export surface.
pub fn round_confidence(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

/// Kind of business entity a [`Hub`] represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Plant,
    Disease,
    Pest,
}

impl EntityType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Plant => "plant",
            EntityType::Disease => "disease",
            EntityType::Pest => "pest",
        }
    }

    /// True for diseases and pests - the entity kinds a plant can be linked to.
    #[must_use]
    pub fn is_problem(&self) -> bool {
        matches!(self, EntityType::Disease | EntityType::Pest)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A business entity observed in one image (a plant, a disease or a pest)
///
/// Identity: `hub_key` = hash of (`business_key`, `entity_type`). Two hubs
/// with the same key are the same entity, which enables deduplication when
/// schemas are merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hub {
    pub hub_key: String,
    /// Normalized lowercase term identifying the entity (e.g. "corn")
    pub business_key: String,
    pub entity_type: EntityType,
    pub ontology_uri: String,
    pub confidence_score: f32,
    pub load_date: DateTime<Utc>,
    pub record_source: String,
}

impl Hub {
    pub fn new(
        business_key: impl Into<String>,
        entity_type: EntityType,
        ontology_uri: impl Into<String>,
        confidence_score: f32,
        record_source: impl Into<String>,
    ) -> Self {
        Self::new_at(
            business_key,
            entity_type,
            ontology_uri,
            confidence_score,
            record_source,
            Utc::now(),
        )
    }

    /// Create a hub with an explicit load date (injected clock for tests).
    pub fn new_at(
        business_key: impl Into<String>,
        entity_type: EntityType,
        ontology_uri: impl Into<String>,
        confidence_score: f32,
        record_source: impl Into<String>,
        load_date: DateTime<Utc>,
    ) -> Self {
        let business_key = business_key.into().to_lowercase();
        let hub_key = derive_key(&format!("{}_{}", business_key, entity_type.as_str()));
        Self {
            hub_key,
            business_key,
            entity_type,
            ontology_uri: ontology_uri.into(),
            confidence_score,
            load_date,
            record_source: record_source.into(),
        }
    }

    /// Export read model. Field names and 4-decimal confidence rounding are a
    /// compatibility surface - keep them stable.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "hub_key": self.hub_key,
            "business_key": self.business_key,
            "entity_type": self.entity_type.as_str(),
            "ontology_uri": self.ontology_uri,
            "confidence_score": round_confidence(self.confidence_score),
            "load_date": self.load_date.to_rfc3339(),
            "record_source": self.record_source,
        })
    }
}

/// A directed, typed relation between two hubs
///
/// Endpoint keys are loose references: they are checked by schema validation,
/// not enforced structurally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub link_key: String,
    pub hub_source_key: String,
    pub hub_target_key: String,
    pub relation_type: String,
    pub confidence_score: f32,
    pub load_date: DateTime<Utc>,
    pub record_source: String,
}

impl Link {
    pub fn new(
        hub_source_key: impl Into<String>,
        hub_target_key: impl Into<String>,
        relation_type: impl Into<String>,
        confidence_score: f32,
        record_source: impl Into<String>,
    ) -> Self {
        Self::new_at(
            hub_source_key,
            hub_target_key,
            relation_type,
            confidence_score,
            record_source,
            Utc::now(),
        )
    }

    /// Create a link with an explicit load date (injected clock for tests).
    pub fn new_at(
        hub_source_key: impl Into<String>,
        hub_target_key: impl Into<String>,
        relation_type: impl Into<String>,
        confidence_score: f32,
        record_source: impl Into<String>,
        load_date: DateTime<Utc>,
    ) -> Self {
        let hub_source_key = hub_source_key.into();
        let hub_target_key = hub_target_key.into();
        let relation_type = relation_type.into();
        let link_key = derive_key(&format!(
            "{}_{}_{}",
            hub_source_key, relation_type, hub_target_key
        ));
        Self {
            link_key,
            hub_source_key,
            hub_target_key,
            relation_type,
            confidence_score,
            load_date,
            record_source: record_source.into(),
        }
    }

    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "link_key": self.link_key,
            "hub_source_key": self.hub_source_key,
            "hub_target_key": self.hub_target_key,
            "relation_type": self.relation_type,
            "confidence_score": round_confidence(self.confidence_score),
            "load_date": self.load_date.to_rfc3339(),
            "record_source": self.record_source,
        })
    }
}

/// A descriptive attribute attached to exactly one hub
///
/// Identity: `satellite_key` = hash of (`hub_key`, `attribute_name`, load
/// timestamp). The time salt makes repeated identical observations distinct
/// records - append-only history semantics. `hash_diff` covers name, value and
/// score for change detection across repeated observations of the same entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Satellite {
    pub satellite_key: String,
    pub hub_key: String,
    pub attribute_name: String,
    pub attribute_value: String,
    pub confidence_score: f32,
    pub load_date: DateTime<Utc>,
    pub record_source: String,
    pub hash_diff: String,
}

impl Satellite {
    pub fn new(
        hub_key: impl Into<String>,
        attribute_name: impl Into<String>,
        attribute_value: impl Into<String>,
        confidence_score: f32,
        record_source: impl Into<String>,
    ) -> Self {
        Self::new_at(
            hub_key,
            attribute_name,
            attribute_value,
            confidence_score,
            record_source,
            Utc::now(),
        )
    }

    /// Create a satellite with an explicit load date. The time-salted key is
    /// deterministic under an injected clock.
    pub fn new_at(
        hub_key: impl Into<String>,
        attribute_name: impl Into<String>,
        attribute_value: impl Into<String>,
        confidence_score: f32,
        record_source: impl Into<String>,
        load_date: DateTime<Utc>,
    ) -> Self {
        let hub_key = hub_key.into();
        let attribute_name = attribute_name.into();
        let attribute_value = attribute_value.into();
        let satellite_key = derive_key(&format!(
            "{}_{}_{}",
            hub_key,
            attribute_name,
            load_date.timestamp_micros()
        ));
        let hash_diff = derive_key(&format!(
            "{}_{}_{}",
            attribute_name, attribute_value, confidence_score
        ));
        Self {
            satellite_key,
            hub_key,
            attribute_name,
            attribute_value,
            confidence_score,
            load_date,
            record_source: record_source.into(),
            hash_diff,
        }
    }

    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "satellite_key": self.satellite_key,
            "hub_key": self.hub_key,
            "attribute_name": self.attribute_name,
            "attribute_value": self.attribute_value,
            "confidence_score": round_confidence(self.confidence_score),
            "load_date": self.load_date.to_rfc3339(),
            "record_source": self.record_source,
            "hash_diff": self.hash_diff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_hub_key_is_content_derived() {
        let a = Hub::new("corn", EntityType::Plant, "http://example.org/ontology#corn", 1.0, "img1.jpg");
        let b = Hub::new("corn", EntityType::Plant, "http://example.org/ontology#corn", 0.8, "img2.jpg");
        // Same business key and type means same entity, regardless of source
        assert_eq!(a.hub_key, b.hub_key);
        assert_eq!(a.hub_key.len(), KEY_WIDTH);
    }

    #[test]
    fn test_hub_key_differs_by_entity_type() {
        let plant = Hub::new("striure", EntityType::Plant, "", 1.0, "img1.jpg");
        let disease = Hub::new("striure", EntityType::Disease, "", 1.0, "img1.jpg");
        assert_ne!(plant.hub_key, disease.hub_key);
    }

    #[test]
    fn test_hub_business_key_lowercased() {
        let hub = Hub::new("Corn", EntityType::Plant, "", 1.0, "img1.jpg");
        assert_eq!(hub.business_key, "corn");
    }

    #[test]
    fn test_link_key_depends_on_direction() {
        let ab = Link::new("aaa", "bbb", "has_disease", 1.0, "img1.jpg");
        let ba = Link::new("bbb", "aaa", "has_disease", 1.0, "img1.jpg");
        assert_ne!(ab.link_key, ba.link_key);
    }

    #[test]
    fn test_satellite_key_is_time_salted() {
        let t1 = fixed_clock();
        let t2 = t1 + chrono::Duration::seconds(1);
        let a = Satellite::new_at("hub", "symptom", "necrose", 0.95, "img1.jpg", t1);
        let b = Satellite::new_at("hub", "symptom", "necrose", 0.95, "img1.jpg", t2);
        // Identical observation at a later time is a distinct record
        assert_ne!(a.satellite_key, b.satellite_key);
        // But the key is deterministic under a fixed clock
        let c = Satellite::new_at("hub", "symptom", "necrose", 0.95, "img1.jpg", t1);
        assert_eq!(a.satellite_key, c.satellite_key);
        assert_eq!(a.hash_diff, b.hash_diff);
    }

    #[test]
    fn test_record_confidence_rounded_to_4_decimals() {
        let hub = Hub::new("corn", EntityType::Plant, "", 0.123456, "img1.jpg");
        let record = hub.to_record();
        assert_eq!(record["confidence_score"].as_f64().unwrap(), 0.1235);
    }

    #[test]
    fn test_record_load_date_is_iso8601() {
        let hub = Hub::new_at("corn", EntityType::Plant, "", 1.0, "img1.jpg", fixed_clock());
        let record = hub.to_record();
        assert_eq!(record["load_date"].as_str().unwrap(), "2024-06-01T12:00:00+00:00");
    }
}
