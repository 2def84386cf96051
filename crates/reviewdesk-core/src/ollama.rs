//! Ollama client for embeddings and completion. Wraps ollama-rs with a simple API.

use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use ollama_rs::Ollama;

use crate::backend::{BackendError, Embedder, Generator};
use crate::config::{Config, DEFAULT_CHAT_MODEL, DEFAULT_EMBED_BATCH_SIZE, DEFAULT_EMBED_MODEL};

/// Thin wrapper around Ollama for embedding and completion.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    inner: Ollama,
    embed_model: String,
    chat_model: String,
    batch_size: usize,
}

impl OllamaClient {
    /// Create from URL string, e.g. `http://localhost:11434`.
    pub fn from_url(url: &str) -> Result<Self, BackendError> {
        let inner = Ollama::try_new(url)?;
        Ok(Self {
            inner,
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
        })
    }

    /// Client for the endpoint and models named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        Ok(Self::from_url(&config.ollama_url)?
            .with_embed_model(&config.embed_model)
            .with_chat_model(&config.chat_model)
            .with_batch_size(config.embed_batch_size))
    }

    /// Set the embedding model (e.g. `mxbai-embed-large`, `nomic-embed-text`).
    pub fn with_embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = model.into();
        self
    }

    /// Set the completion model (e.g. `llama3.2`).
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Max texts sent per embedding request. Zero means no limit.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    async fn request_embeddings(&self, input: EmbeddingsInput) -> Result<Vec<Vec<f32>>, BackendError> {
        let req = GenerateEmbeddingsRequest::new(self.embed_model.clone(), input);
        let res = self
            .inner
            .generate_embeddings(req)
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Ok(res.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    fn model(&self) -> &str {
        &self.embed_model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let mut res = self
            .request_embeddings(EmbeddingsInput::Single(text.to_string()))
            .await?;
        if res.len() != 1 {
            return Err(BackendError::EmbeddingCount {
                expected: 1,
                received: res.len(),
            });
        }
        Ok(res.swap_remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let size = if self.batch_size == 0 { texts.len() } else { self.batch_size };
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(size) {
            let res = self
                .request_embeddings(EmbeddingsInput::Multiple(batch.to_vec()))
                .await?;
            if res.len() != batch.len() {
                return Err(BackendError::EmbeddingCount {
                    expected: batch.len(),
                    received: res.len(),
                });
            }
            tracing::debug!(done = out.len() + res.len(), total = texts.len(), "embedded batch");
            out.extend(res);
        }
        Ok(out)
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let req = GenerationRequest::new(self.chat_model.clone(), prompt.to_string());
        let res = self
            .inner
            .generate(req)
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Ok(res.response)
    }
}
