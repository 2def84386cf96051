//! Seams to the model backends. [`crate::ollama::OllamaClient`] implements
//! both; tests swap in fakes.

use async_trait::async_trait;

/// Turns text into embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Name of the embedding model, recorded alongside the index.
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError>;

    /// One embedding per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError>;
}

/// Single-shot, non-streaming text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

/// The embedding or generation backend could not serve a request.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid Ollama URL: {0}")]
    ParseUrl(#[from] url::ParseError),
    #[error("Ollama request failed: {0}")]
    Request(String),
    #[error("expected {expected} embeddings, got {received}")]
    EmbeddingCount { expected: usize, received: usize },
}
