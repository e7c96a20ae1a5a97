//! # LeafVault Export
//!
//! Exporters over the Data Vault schema read model: pretty or compact JSON,
//! a PostgreSQL script and an RDF/Turtle document. All exporters consume only
//! the schema's public surface, so they stay insulated from entity internals.

pub mod json;
pub mod rdf;
pub mod sql;

pub use json::JsonExporter;
pub use rdf::{RdfExporter, DEFAULT_BASE_URI};
pub use sql::SqlExporter;

/// Version stamped into export metadata.
pub const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");
