//! Embedding providers
//!
//! Semantic similarity needs dense vectors for the lemma and the candidate
//! term. The [`EmbeddingProvider`] trait abstracts over the source; the
//! default implementation talks to a local Ollama instance over HTTP.

use serde::Deserialize;
use thiserror::Error;

/// Dimension of the default embedding model (all-minilm).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default embedding model name.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Request(String),

    #[error("Invalid embedding response: {0}")]
    Response(String),
}

/// Source of dense text embeddings.
pub trait EmbeddingProvider {
    /// Embed a single text into a dense vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Dimension of the vectors this provider returns.
    fn dimension(&self) -> usize {
        DEFAULT_EMBEDDING_DIM
    }
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedding provider backed by the Ollama `/api/embeddings` endpoint.
pub struct OllamaEmbedder {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    /// Create an embedder against the given Ollama base URL and model.
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: format!("{}/api/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            dimension: DEFAULT_EMBEDDING_DIM,
        }
    }

    /// Embedder with the default local endpoint and model.
    pub fn local() -> Self {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_EMBEDDING_MODEL)
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "model": self.model,
                "input": text,
            }))
            .send()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EmbeddingError::Request(format!(
                "{} returned status {}",
                self.endpoint,
                response.status()
            )));
        }

        let body: OllamaEmbeddingResponse = response
            .json()
            .map_err(|e| EmbeddingError::Response(e.to_string()))?;

        if body.embedding.is_empty() {
            return Err(EmbeddingError::Response(
                "empty embedding vector".to_string(),
            ));
        }

        Ok(body.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let embedder = OllamaEmbedder::new("http://localhost:11434/", "all-minilm");
        assert_eq!(embedder.endpoint, "http://localhost:11434/api/embeddings");
    }

    #[test]
    fn test_default_dimension() {
        let embedder = OllamaEmbedder::local();
        assert_eq!(embedder.dimension(), 384);
    }
}
