//! Ontology-guided lemma classification
//!
//! Turns the flat lemma list of one image analysis into Data Vault parts:
//! hubs for the plant and its diagnosed problem, one link between them, and
//! satellites for every descriptive attribute. Recognized lemmas classify
//! directly against the controlled vocabulary; unrecognized ones go through a
//! similarity rescue ladder before falling back to a generic description.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use leafvault_core::{EntityType, Error, Hub, Link, Result, Satellite};
use leafvault_similarity::{normalize, SimilarityCalculator};

use crate::vocabulary::{OntologyVocabulary, SatelliteCategory};

/// Similarity thresholds per classification tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Entity (hub) rescue threshold.
    pub entities: f32,
    /// Relation threshold. Reserved: relation lemmas currently match by
    /// exact table lookup only, so no code path consults it.
    pub relations: f32,
    /// Attribute (satellite) rescue threshold.
    pub attributes: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            entities: 0.75,
            relations: 0.70,
            attributes: 0.65,
        }
    }
}

/// Output of one classification pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub hubs: Vec<Hub>,
    pub links: Vec<Link>,
    pub satellites: Vec<Satellite>,
}

/// Attribute name used for lemmas nothing else recognized.
const GENERIC_ATTRIBUTE: &str = "description";

/// Confidence assigned to directly classified satellites and generic
/// descriptions.
const DIRECT_SATELLITE_CONFIDENCE: f32 = 0.95;

enum DirectCategory {
    Plant,
    Disease,
    Pest,
    Relation,
    Satellite(SatelliteCategory),
    Unknown,
}

/// Satellite observed during the first pass, attached to a hub in the second.
struct PendingSatellite {
    attribute_name: &'static str,
    attribute_value: String,
    confidence: f32,
}

pub struct OntologyMatcher {
    vocabulary: OntologyVocabulary,
    calculator: SimilarityCalculator,
    thresholds: Thresholds,
    // Flattened term sets, built once so every lemma scan reuses them
    hub_vocab: Vec<String>,
    satellite_vocab: Vec<String>,
    plants: AHashSet<String>,
    diseases: AHashSet<String>,
    pests: AHashSet<String>,
    relations: AHashSet<String>,
    satellite_tables: Vec<(AHashSet<String>, SatelliteCategory)>,
}

impl OntologyMatcher {
    pub fn new(
        vocabulary: OntologyVocabulary,
        calculator: SimilarityCalculator,
        thresholds: Thresholds,
    ) -> Self {
        let hub_vocab = vocabulary.hub_terms();
        let satellite_vocab = vocabulary.satellite_terms();
        let plants = vocabulary.plants().iter().cloned().collect();
        let diseases = vocabulary.diseases(None).into_iter().collect();
        let pests = vocabulary.pests(None).into_iter().collect();
        let relations = vocabulary.relations().iter().cloned().collect();
        let satellite_tables = vec![
            (
                vocabulary.symptoms().iter().cloned().collect(),
                SatelliteCategory::Symptom,
            ),
            (
                vocabulary.leaf_states().into_iter().collect(),
                SatelliteCategory::LeafState,
            ),
            (
                vocabulary.colors().into_iter().collect(),
                SatelliteCategory::Color,
            ),
            (
                vocabulary.shapes().iter().cloned().collect(),
                SatelliteCategory::Shape,
            ),
            (
                vocabulary.textures().iter().cloned().collect(),
                SatelliteCategory::Texture,
            ),
            (
                vocabulary.venation().iter().cloned().collect(),
                SatelliteCategory::Venation,
            ),
        ];
        Self {
            vocabulary,
            calculator,
            thresholds,
            hub_vocab,
            satellite_vocab,
            plants,
            diseases,
            pests,
            relations,
            satellite_tables,
        }
    }

    pub fn vocabulary(&self) -> &OntologyVocabulary {
        &self.vocabulary
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Classify the lemmas of one image into hubs, links and satellites.
    ///
    /// Two passes: the first resolves every lemma to a category, keeping one
    /// plant slot and one problem slot (a later plant or problem takes over
    /// the slot, earlier hubs stay in the output; similarity-rescued hubs
    /// join the output without filling either slot). The second wires the
    /// link and attaches pending satellites: symptoms describe the problem,
    /// everything else describes the plant.
    pub fn classify_lemmas(&self, lemmas: &[String], source: &str) -> Result<Classification> {
        if lemmas.is_empty() {
            return Err(Error::NoLemmas);
        }
        debug!(count = lemmas.len(), source, "classifying lemmas");

        let mut hubs: Vec<Hub> = Vec::new();
        let mut pending: Vec<PendingSatellite> = Vec::new();
        let mut plant_hub: Option<Hub> = None;
        let mut problem_hub: Option<Hub> = None;
        let mut relation_lemma: Option<String> = None;

        for lemma in lemmas {
            let lower = lemma.trim().to_lowercase();
            match self.direct_category(&lower) {
                DirectCategory::Plant => {
                    let hub = self.exact_hub(&lower, EntityType::Plant, source);
                    debug!(lemma = %lower, "hub plant");
                    plant_hub = Some(hub.clone());
                    hubs.push(hub);
                }
                DirectCategory::Disease => {
                    let hub = self.exact_hub(&lower, EntityType::Disease, source);
                    debug!(lemma = %lower, "hub disease");
                    problem_hub = Some(hub.clone());
                    hubs.push(hub);
                }
                DirectCategory::Pest => {
                    let hub = self.exact_hub(&lower, EntityType::Pest, source);
                    debug!(lemma = %lower, "hub pest");
                    problem_hub = Some(hub.clone());
                    hubs.push(hub);
                }
                DirectCategory::Relation => {
                    debug!(lemma = %lower, "relation");
                    relation_lemma = Some(lower);
                }
                DirectCategory::Satellite(category) => {
                    debug!(lemma = %lower, category = %category, "satellite");
                    pending.push(PendingSatellite {
                        attribute_name: category.as_str(),
                        attribute_value: lower,
                        confidence: DIRECT_SATELLITE_CONFIDENCE,
                    });
                }
                DirectCategory::Unknown => {
                    self.rescue_lemma(&lower, source, &mut hubs, &mut pending);
                }
            }
        }

        let mut links = Vec::new();
        if let (Some(plant), Some(problem)) = (&plant_hub, &problem_hub) {
            let relation_type = match relation_lemma {
                Some(lemma) => lemma,
                None => match problem.entity_type {
                    EntityType::Disease => "has_disease".to_string(),
                    EntityType::Pest => "has_infestation".to_string(),
                    EntityType::Plant => "has_health_status".to_string(),
                },
            };
            debug!(
                plant = %plant.business_key,
                problem = %problem.business_key,
                relation = %relation_type,
                "link"
            );
            links.push(Link::new(
                &plant.hub_key,
                &problem.hub_key,
                relation_type,
                1.0,
                source,
            ));
        }

        let mut satellites = Vec::new();
        for sat in pending {
            let parent = if sat.attribute_name == SatelliteCategory::Symptom.as_str() {
                problem_hub.as_ref().or(plant_hub.as_ref())
            } else {
                plant_hub.as_ref()
            }
            .or_else(|| hubs.first());
            let Some(parent) = parent else {
                debug!(value = %sat.attribute_value, "satellite dropped, no hub to attach to");
                continue;
            };
            satellites.push(Satellite::new(
                &parent.hub_key,
                sat.attribute_name,
                sat.attribute_value,
                sat.confidence,
                source,
            ));
        }

        debug!(
            hubs = hubs.len(),
            links = links.len(),
            satellites = satellites.len(),
            "classification done"
        );
        Ok(Classification {
            hubs,
            links,
            satellites,
        })
    }

    /// Exact-membership category of a lowercased lemma, in fixed priority
    /// order.
    fn direct_category(&self, lower: &str) -> DirectCategory {
        if self.plants.contains(lower) {
            return DirectCategory::Plant;
        }
        if self.diseases.contains(lower) {
            return DirectCategory::Disease;
        }
        if self.pests.contains(lower) {
            return DirectCategory::Pest;
        }
        if self.relations.contains(lower) {
            return DirectCategory::Relation;
        }
        for (table, category) in &self.satellite_tables {
            if table.contains(lower) {
                return DirectCategory::Satellite(*category);
            }
        }
        DirectCategory::Unknown
    }

    /// Similarity rescue for unrecognized lemmas: hub vocabulary first, then
    /// satellite vocabulary, then a generic description for anything longer
    /// than 2 characters. Rescued records carry the match score as confidence.
    /// A rescued hub is appended to the hub list only; it never claims the
    /// plant or problem slot, so links form between directly recognized hubs.
    fn rescue_lemma(
        &self,
        lower: &str,
        source: &str,
        hubs: &mut Vec<Hub>,
        pending: &mut Vec<PendingSatellite>,
    ) {
        let (matched, score) = self
            .calculator
            .best_match(lower, &self.hub_vocab, self.thresholds.entities);
        if let Some(matched) = matched {
            let entity_type = if self.plants.contains(matched) {
                EntityType::Plant
            } else if self.diseases.contains(matched) {
                EntityType::Disease
            } else {
                EntityType::Pest
            };
            debug!(lemma = %lower, matched, score, "hub rescued by similarity");
            // Business key keeps the observed lemma; the URI points at the
            // ontology term it matched
            hubs.push(Hub::new(
                lower,
                entity_type,
                ontology_uri(matched),
                score,
                source,
            ));
            return;
        }

        let (matched, score) = self
            .calculator
            .best_match(lower, &self.satellite_vocab, self.thresholds.attributes);
        if let Some(matched) = matched {
            let attribute_name = self
                .vocabulary
                .satellite_category_of(matched)
                .map(|category| category.as_str())
                .unwrap_or(GENERIC_ATTRIBUTE);
            debug!(lemma = %lower, matched, score, attribute_name, "satellite rescued by similarity");
            pending.push(PendingSatellite {
                attribute_name,
                attribute_value: lower.to_string(),
                confidence: score,
            });
            return;
        }

        if normalize(lower).chars().count() > 2 {
            debug!(lemma = %lower, "generic description satellite");
            pending.push(PendingSatellite {
                attribute_name: GENERIC_ATTRIBUTE,
                attribute_value: lower.to_string(),
                confidence: DIRECT_SATELLITE_CONFIDENCE,
            });
        } else {
            debug!(lemma = %lower, "lemma discarded");
        }
    }

    fn exact_hub(&self, lower: &str, entity_type: EntityType, source: &str) -> Hub {
        Hub::new(lower, entity_type, ontology_uri(lower), 1.0, source)
    }
}

fn ontology_uri(term: &str) -> String {
    format!("http://example.org/ontology#{term}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafvault_similarity::Algorithm;

    fn matcher() -> OntologyMatcher {
        OntologyMatcher::new(
            OntologyVocabulary::default(),
            SimilarityCalculator::new(Algorithm::Lexical),
            Thresholds::default(),
        )
    }

    fn lemmas(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_lemmas_is_an_error() {
        let result = matcher().classify_lemmas(&[], "img.jpg");
        assert!(matches!(result, Err(Error::NoLemmas)));
    }

    #[test]
    fn test_diseased_plant_cardinality() {
        let classification = matcher()
            .classify_lemmas(
                &lemmas(&["corn", "has_disease", "helminthosporiose", "necrose", "vert_fonce"]),
                "img.jpg",
            )
            .unwrap();

        assert_eq!(classification.hubs.len(), 2);
        assert_eq!(classification.links.len(), 1);
        assert_eq!(classification.satellites.len(), 2);

        let plant = &classification.hubs[0];
        let disease = &classification.hubs[1];
        assert_eq!(plant.entity_type, EntityType::Plant);
        assert_eq!(disease.entity_type, EntityType::Disease);
        assert_eq!(disease.business_key, "helminthosporiose");

        let link = &classification.links[0];
        assert_eq!(link.hub_source_key, plant.hub_key);
        assert_eq!(link.hub_target_key, disease.hub_key);
        assert_eq!(link.relation_type, "has_disease");
        assert_eq!(link.confidence_score, 1.0);

        // Symptom describes the problem, color describes the plant
        let necrose = classification
            .satellites
            .iter()
            .find(|s| s.attribute_value == "necrose")
            .unwrap();
        assert_eq!(necrose.attribute_name, "symptom");
        assert_eq!(necrose.hub_key, disease.hub_key);
        let color = classification
            .satellites
            .iter()
            .find(|s| s.attribute_value == "vert_fonce")
            .unwrap();
        assert_eq!(color.attribute_name, "color");
        assert_eq!(color.hub_key, plant.hub_key);
    }

    #[test]
    fn test_healthy_plant_has_no_link() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "has_health_status", "sain"]), "img.jpg")
            .unwrap();

        assert_eq!(classification.hubs.len(), 1);
        assert_eq!(classification.links.len(), 0);
        assert_eq!(classification.satellites.len(), 1);

        let sat = &classification.satellites[0];
        assert_eq!(sat.attribute_name, "health_state");
        assert_eq!(sat.attribute_value, "sain");
        assert_eq!(sat.hub_key, classification.hubs[0].hub_key);
    }

    #[test]
    fn test_relation_inferred_from_pest() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "puceron"]), "img.jpg")
            .unwrap();
        assert_eq!(classification.links.len(), 1);
        assert_eq!(classification.links[0].relation_type, "has_infestation");
    }

    #[test]
    fn test_explicit_relation_lemma_wins_over_inference() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "a_maladie", "rouille"]), "img.jpg")
            .unwrap();
        assert_eq!(classification.links[0].relation_type, "a_maladie");
    }

    #[test]
    fn test_last_problem_wins_the_link() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "rouille", "fusariose"]), "img.jpg")
            .unwrap();
        // Both problem hubs survive, the link targets the last one
        assert_eq!(classification.hubs.len(), 3);
        assert_eq!(classification.links.len(), 1);
        let fusariose = classification
            .hubs
            .iter()
            .find(|h| h.business_key == "fusariose")
            .unwrap();
        assert_eq!(classification.links[0].hub_target_key, fusariose.hub_key);
    }

    #[test]
    fn test_misspelled_disease_rescued_by_similarity() {
        // Pure Jaro-Winkler keeps the rescue score below 1.0, which pins
        // that rescued hubs carry the match score as confidence
        let matcher = OntologyMatcher::new(
            OntologyVocabulary::default(),
            SimilarityCalculator::new(Algorithm::JaroWinkler),
            Thresholds::default(),
        );
        let classification = matcher
            .classify_lemmas(&lemmas(&["corn", "helminthosporios"]), "img.jpg")
            .unwrap();

        assert_eq!(classification.hubs.len(), 2);
        let disease = &classification.hubs[1];
        assert_eq!(disease.entity_type, EntityType::Disease);
        assert_eq!(disease.business_key, "helminthosporios");
        assert!(disease.ontology_uri.ends_with("#helminthosporiose"));
        assert!(disease.confidence_score >= 0.75);
        assert!(disease.confidence_score < 1.0);
        // A rescued hub never fills the problem slot, so no link is minted
        assert!(classification.links.is_empty());
    }

    #[test]
    fn test_rescued_hub_does_not_displace_a_recognized_problem() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "rouille", "helminthosporios"]), "img.jpg")
            .unwrap();

        assert_eq!(classification.hubs.len(), 3);
        assert_eq!(classification.links.len(), 1);
        // The link keeps targeting the directly recognized disease
        let rouille = classification
            .hubs
            .iter()
            .find(|h| h.business_key == "rouille")
            .unwrap();
        assert_eq!(classification.links[0].hub_target_key, rouille.hub_key);
    }

    #[test]
    fn test_rescued_satellite_keeps_its_category() {
        // "necrose severe" misses the hub vocabulary but rescues against the
        // satellite vocabulary, landing in the matched term's category
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "necrose severe"]), "img.jpg")
            .unwrap();

        assert_eq!(classification.hubs.len(), 1);
        assert_eq!(classification.satellites.len(), 1);
        let sat = &classification.satellites[0];
        assert_eq!(sat.attribute_name, "symptom");
        assert_eq!(sat.attribute_value, "necrose severe");
        assert!(sat.confidence_score >= 0.65);
    }

    #[test]
    fn test_default_thresholds() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.entities, 0.75);
        assert_eq!(thresholds.relations, 0.70);
        assert_eq!(thresholds.attributes, 0.65);
    }

    #[test]
    fn test_unmatched_long_lemma_becomes_description() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "zzzzqqqqxxxx"]), "img.jpg")
            .unwrap();
        let sat = &classification.satellites[0];
        assert_eq!(sat.attribute_name, "description");
        assert_eq!(sat.attribute_value, "zzzzqqqqxxxx");
        assert_eq!(sat.confidence_score, 0.95);
    }

    #[test]
    fn test_short_noise_lemma_is_discarded() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "xq"]), "img.jpg")
            .unwrap();
        assert_eq!(classification.hubs.len(), 1);
        assert!(classification.satellites.is_empty());
    }

    #[test]
    fn test_satellite_without_any_hub_is_dropped() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["necrose"]), "img.jpg")
            .unwrap();
        assert!(classification.hubs.is_empty());
        assert!(classification.links.is_empty());
        assert!(classification.satellites.is_empty());
    }

    #[test]
    fn test_symptom_falls_back_to_plant_hub_without_problem() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "necrose"]), "img.jpg")
            .unwrap();
        assert_eq!(classification.satellites.len(), 1);
        assert_eq!(
            classification.satellites[0].hub_key,
            classification.hubs[0].hub_key
        );
    }

    #[test]
    fn test_direct_satellite_confidence() {
        let classification = matcher()
            .classify_lemmas(&lemmas(&["corn", "lisse", "nervation_parallele"]), "img.jpg")
            .unwrap();
        for sat in &classification.satellites {
            assert_eq!(sat.confidence_score, 0.95);
        }
        let names: Vec<&str> = classification
            .satellites
            .iter()
            .map(|s| s.attribute_name.as_str())
            .collect();
        assert!(names.contains(&"texture"));
        assert!(names.contains(&"venation"));
    }
}
