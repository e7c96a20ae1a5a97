//! # LeafVault Core
//!
//! Core library for LeafVault: the Data Vault data model and its lifecycle.
//!
//! This crate provides the fundamental building blocks:
//!
//! - [`Hub`], [`Link`], [`Satellite`] - value records with content-derived keys
//! - [`DataVaultSchema`] - the immutable per-image schema snapshot
//! - [`DataVaultGenerator`] - assembly, validation and merging
//! - [`Diagnostic`] - structured, never-raised validation findings
//!
//! ## Example
//!
//! ```rust
//! use leafvault_core::{DataVaultGenerator, EntityType, Hub, Link};
//!
//! let plant = Hub::new("corn", EntityType::Plant, "http://example.org/ontology#corn", 1.0, "img1.jpg");
//! let disease = Hub::new("rouille", EntityType::Disease, "http://example.org/ontology#rouille", 0.9, "img1.jpg");
//! let link = Link::new(&plant.hub_key, &disease.hub_key, "has_disease", 1.0, "img1.jpg");
//!
//! let generator = DataVaultGenerator::new();
//! let schema = generator.generate_schema(
//!     vec![plant, disease],
//!     vec![link],
//!     vec![],
//!     "img1.jpg",
//!     &["corn".to_string(), "rouille".to_string()],
//! );
//! assert!(generator.validate_schema(&schema).is_empty());
//! ```

pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod generator;
pub mod schema;

pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use entity::{derive_key, round_confidence, EntityType, Hub, Link, Satellite, KEY_WIDTH};
pub use error::{Error, Result};
pub use generator::{DataVaultGenerator, GENERATOR_VERSION};
pub use schema::{AverageConfidence, DataVaultSchema, SchemaMetadata, SchemaStatistics};
