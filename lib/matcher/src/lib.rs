//! # LeafVault Matcher
//!
//! Ontology-guided classification of vision-model lemmas.
//!
//! [`OntologyVocabulary`] holds the controlled term tables (plants, diseases,
//! pests, relations and attribute categories). [`OntologyMatcher`] turns a
//! lemma list into Data Vault hubs, links and satellites: direct vocabulary
//! lookup first, then a similarity rescue ladder over the hub and satellite
//! vocabularies, then a generic description fallback.

pub mod matcher;
pub mod vocabulary;

pub use matcher::{Classification, OntologyMatcher, Thresholds};
pub use vocabulary::{
    normalize_key, validate_term, OntologyVocabulary, SatelliteCategory, DEFAULT_FUZZY_CUTOFF,
};
