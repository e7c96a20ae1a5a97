//! Similarity calculator
//!
//! Combines the lexical distances with remote embeddings behind a single
//! `similarity(a, b) -> f32` surface. The calculator memoizes normalization
//! and embeddings per instance, so repeated scans over the same vocabulary
//! hit the network once per distinct term.

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::distance;
use crate::embedding::{EmbeddingProvider, OllamaEmbedder};
use crate::normalize::normalize;
use crate::ops;

/// Similarity algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Jaro-Winkler with prefix and substring bonuses.
    Lexical,
    /// Embedding cosine remapped to [0, 1].
    Semantic,
    /// Character bigram cosine.
    NgramCosine,
    /// Pure Jaro-Winkler, no bonuses.
    JaroWinkler,
    /// Max of Jaro-Winkler and bigram cosine.
    JaroCosine,
    /// Max of lexical and semantic. The default.
    #[default]
    Hybrid,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Lexical => "lexical",
            Algorithm::Semantic => "semantic",
            Algorithm::NgramCosine => "ngram_cosine",
            Algorithm::JaroWinkler => "jaro_winkler",
            Algorithm::JaroCosine => "jaro_cosine",
            Algorithm::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexical" => Ok(Algorithm::Lexical),
            "semantic" => Ok(Algorithm::Semantic),
            "ngram_cosine" => Ok(Algorithm::NgramCosine),
            "jaro_winkler" => Ok(Algorithm::JaroWinkler),
            "jaro_cosine" => Ok(Algorithm::JaroCosine),
            "hybrid" => Ok(Algorithm::Hybrid),
            other => Err(format!("unknown similarity algorithm: {other}")),
        }
    }
}

/// Stateful similarity scorer with per-instance memoization.
///
/// The caches live in `RefCell`s, so a calculator is cheap to share within a
/// thread but is deliberately not `Sync`.
pub struct SimilarityCalculator {
    algorithm: Algorithm,
    embedder: Box<dyn EmbeddingProvider>,
    normalize_cache: RefCell<AHashMap<String, String>>,
    embedding_cache: RefCell<AHashMap<String, Vec<f32>>>,
}

impl SimilarityCalculator {
    /// Calculator with the given algorithm and the default local Ollama embedder.
    pub fn new(algorithm: Algorithm) -> Self {
        Self::with_embedder(algorithm, Box::new(OllamaEmbedder::local()))
    }

    /// Calculator with an explicit embedding provider.
    pub fn with_embedder(algorithm: Algorithm, embedder: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            algorithm,
            embedder,
            normalize_cache: RefCell::new(AHashMap::new()),
            embedding_cache: RefCell::new(AHashMap::new()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Similarity between two raw strings in [0, 1].
    ///
    /// Strings that normalize to the same form score 1.0 without touching the
    /// network, whatever the configured algorithm. Lexical kernels run on the
    /// normalized forms; embeddings are fetched for the raw strings, since the
    /// model handles casing and diacritics itself.
    pub fn similarity(&self, a: &str, b: &str) -> f32 {
        let na = self.normalized(a);
        let nb = self.normalized(b);
        if na == nb {
            return 1.0;
        }
        self.score(a, b, &na, &nb)
    }

    /// Best match for `lemma` among `candidates`.
    ///
    /// Returns the first candidate with the strictly highest score at or
    /// above `threshold`, or `(None, 0.0)` when nothing qualifies. Ties go to
    /// the earlier candidate.
    pub fn best_match<'a>(
        &self,
        lemma: &str,
        candidates: &'a [String],
        threshold: f32,
    ) -> (Option<&'a str>, f32) {
        let scores = self.batch_similarity(lemma, candidates);
        let mut best: Option<&str> = None;
        let mut best_score = 0.0f32;
        for (candidate, score) in candidates.iter().zip(scores) {
            if score > best_score {
                best = Some(candidate);
                best_score = score;
            }
        }
        if best_score >= threshold && best.is_some() {
            debug!(lemma, matched = best, score = best_score, "best match");
            (best, best_score)
        } else {
            (None, 0.0)
        }
    }

    /// Score one lemma against many candidates.
    ///
    /// Hoists the lemma's normalization and embedding out of the loop but
    /// runs the same kernels as [`similarity`](Self::similarity), so the
    /// scores are identical to the scalar path.
    pub fn batch_similarity(&self, lemma: &str, candidates: &[String]) -> Vec<f32> {
        let na = self.normalized(lemma);
        candidates
            .iter()
            .map(|candidate| {
                let nb = self.normalized(candidate);
                if na == nb {
                    1.0
                } else {
                    self.score(lemma, candidate, &na, &nb)
                }
            })
            .collect()
    }

    /// Number of cached embeddings.
    pub fn cache_len(&self) -> usize {
        self.embedding_cache.borrow().len()
    }

    /// Drop all memoized normalizations and embeddings.
    pub fn clear_cache(&self) {
        self.normalize_cache.borrow_mut().clear();
        self.embedding_cache.borrow_mut().clear();
    }

    fn normalized(&self, s: &str) -> String {
        if let Some(cached) = self.normalize_cache.borrow().get(s) {
            return cached.clone();
        }
        let normalized = normalize(s);
        self.normalize_cache
            .borrow_mut()
            .insert(s.to_string(), normalized.clone());
        normalized
    }

    fn score(&self, a: &str, b: &str, na: &str, nb: &str) -> f32 {
        match self.algorithm {
            Algorithm::Lexical => distance::lexical_similarity(na, nb),
            Algorithm::Semantic => self.semantic_similarity(a, b),
            Algorithm::NgramCosine => distance::bigram_cosine(na, nb),
            Algorithm::JaroWinkler => distance::jaro_winkler(na, nb),
            Algorithm::JaroCosine => {
                distance::jaro_winkler(na, nb).max(distance::bigram_cosine(na, nb))
            }
            Algorithm::Hybrid => {
                distance::lexical_similarity(na, nb).max(self.semantic_similarity(a, b))
            }
        }
    }

    /// Embedding cosine remapped from [-1, 1] to [0, 1].
    ///
    /// Takes the raw strings; the embedding cache is keyed by them too.
    /// A failed embedding degrades to the zero vector: it scores 0.0 against
    /// any real vector and 0.5 against another zero vector, so two unknown
    /// terms stay "neither similar nor dissimilar" instead of spuriously
    /// matching.
    fn semantic_similarity(&self, a: &str, b: &str) -> f32 {
        let va = self.embedding_of(a);
        let vb = self.embedding_of(b);

        let norm_a = ops::norm(&va);
        let norm_b = ops::norm(&vb);
        if norm_a == 0.0 && norm_b == 0.0 {
            return 0.5;
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        let cos = ops::dot(&va, &vb) / (norm_a * norm_b);
        (cos + 1.0) / 2.0
    }

    fn embedding_of(&self, text: &str) -> Vec<f32> {
        if let Some(cached) = self.embedding_cache.borrow().get(text) {
            return cached.clone();
        }
        match self.embedder.embed(text) {
            Ok(vector) => {
                self.embedding_cache
                    .borrow_mut()
                    .insert(text.to_string(), vector.clone());
                vector
            }
            Err(e) => {
                // Failures are not cached so a recovered backend gets retried.
                warn!(text, error = %e, "embedding failed, using zero vector");
                vec![0.0; self.embedder.dimension()]
            }
        }
    }
}
