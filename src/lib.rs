//! # LeafVault
//!
//! Ontology-guided classification of noisy vision-model lemmas about plant
//! photos into a validated Hub-Link-Satellite (Data Vault) schema.
//!
//! The workspace splits into four crates, re-exported here:
//!
//! - [`leafvault_core`] - entity records, schema aggregate, generator and
//!   validation diagnostics
//! - [`leafvault_similarity`] - hybrid lexical/semantic similarity
//! - [`leafvault_matcher`] - the controlled vocabulary and the classification
//!   engine
//! - [`leafvault_export`] - JSON, SQL and RDF/Turtle exporters
//!
//! ## Example
//!
//! ```rust
//! use leafvault::prelude::*;
//!
//! let matcher = OntologyMatcher::new(
//!     OntologyVocabulary::default(),
//!     SimilarityCalculator::new(Algorithm::Lexical),
//!     Thresholds::default(),
//! );
//! let lemmas = vec!["corn".to_string(), "rouille".to_string()];
//! let classification = matcher.classify_lemmas(&lemmas, "field_07.jpg").unwrap();
//!
//! let generator = DataVaultGenerator::new();
//! let schema = generator.generate_schema(
//!     classification.hubs,
//!     classification.links,
//!     classification.satellites,
//!     "field_07.jpg",
//!     &lemmas,
//! );
//! assert_eq!(schema.hubs.len(), 2);
//! ```

pub use leafvault_core as core;
pub use leafvault_export as export;
pub use leafvault_matcher as matcher;
pub use leafvault_similarity as similarity;

pub mod prelude {
    pub use leafvault_core::{
        DataVaultGenerator, DataVaultSchema, Diagnostic, EntityType, Error, Hub, Link, Result,
        Satellite, Severity,
    };
    pub use leafvault_export::{JsonExporter, RdfExporter, SqlExporter};
    pub use leafvault_matcher::{Classification, OntologyMatcher, OntologyVocabulary, Thresholds};
    pub use leafvault_similarity::{Algorithm, SimilarityCalculator};
}
