//! Fake backends for unit tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{BackendError, Embedder, Generator};
use crate::documents::{ReviewDocument, ReviewMetadata};
use crate::index::{IndexError, Retriever};

/// Bag-of-words embedder: each lowercase word bumps one hashed dimension.
#[derive(Default)]
pub struct FakeEmbedder {
    fail: bool,
    batch_calls: AtomicUsize,
    embedded: AtomicUsize,
}

impl FakeEmbedder {
    pub const DIM: usize = 64;

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn embedded_texts(&self) -> usize {
        self.embedded.load(Ordering::SeqCst)
    }

    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; Self::DIM];
        for word in text.split_whitespace() {
            let mut h = DefaultHasher::new();
            word.to_lowercase().hash(&mut h);
            v[(h.finish() % Self::DIM as u64) as usize] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn model(&self) -> &str {
        "fake-embed"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        if self.fail {
            return Err(BackendError::Request("connection refused".to_string()));
        }
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BackendError::Request("connection refused".to_string()));
        }
        self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Retriever returning canned documents and recording each `(query, k)`.
#[derive(Default)]
pub struct FakeRetriever {
    pub docs: Vec<ReviewDocument>,
    pub fail: bool,
    pub calls: Mutex<Vec<(String, usize)>>,
}

impl FakeRetriever {
    pub fn with_docs(docs: Vec<ReviewDocument>) -> Self {
        Self {
            docs,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for FakeRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ReviewDocument>, IndexError> {
        self.calls.lock().unwrap().push((query.to_string(), k));
        if self.fail {
            return Err(BackendError::Request("connection refused".to_string()).into());
        }
        Ok(self.docs.iter().take(k).cloned().collect())
    }
}

/// Generator that echoes a fixed reply and records prompts.
#[derive(Default)]
pub struct FakeGenerator {
    pub reply: String,
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(BackendError::Request("error sending request: connection refused".to_string()));
        }
        Ok(self.reply.clone())
    }
}

pub fn review(id: &str, role: &str, sentiment: &str, text: &str, rating: f64) -> ReviewDocument {
    ReviewDocument {
        id: id.to_string(),
        content: format!("{role} - {sentiment} Review {text}"),
        metadata: ReviewMetadata {
            rating,
            date: "2024-01-01".to_string(),
            reviewer: format!("Reviewer {id}"),
            role: role.to_string(),
            company_size: "50-100".to_string(),
            sentiment: sentiment.to_string(),
        },
    }
}
