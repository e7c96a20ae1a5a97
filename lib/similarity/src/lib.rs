//! # LeafVault Similarity
//!
//! Hybrid string similarity for noisy vision-model lemmas.
//!
//! Six algorithms behind one selector:
//!
//! - `lexical` - Jaro-Winkler with prefix and substring bonuses
//! - `semantic` - embedding cosine over a remote Ollama model
//! - `ngram_cosine` - character bigram cosine
//! - `jaro_winkler` - pure Jaro-Winkler
//! - `jaro_cosine` - max of Jaro-Winkler and bigram cosine
//! - `hybrid` (default) - max of lexical and semantic
//!
//! All comparisons run on normalized text (lowercase, diacritics folded,
//! separators unified), and strings that normalize identically always score
//! 1.0 without a network round trip.

pub mod calculator;
pub mod distance;
pub mod embedding;
pub mod normalize;
pub mod ops;

pub use calculator::{Algorithm, SimilarityCalculator};
pub use distance::{bigram_cosine, jaro, jaro_winkler, lexical_similarity};
pub use embedding::{
    EmbeddingError, EmbeddingProvider, OllamaEmbedder, DEFAULT_EMBEDDING_DIM,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_OLLAMA_URL,
};
pub use normalize::normalize;
