//! Index pipeline: load CSV → build documents → embed → persist, then
//! nearest-neighbour retrieval over the persisted store.
//!
//! Ingestion runs only when the index location does not exist. An existing
//! location is trusted as a complete snapshot and never diffed or updated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{BackendError, Embedder};
use crate::documents::{build_documents, ReviewDocument};
use crate::reviews::{load_reviews, DataLoadError};
use crate::store::{StoreError, VectorStore};

/// Number of reviews handed to the prompt per question.
pub const RETRIEVAL_K: usize = 5;

/// Where the corpus comes from and where its index lives.
#[derive(Debug, Clone)]
pub struct IndexSource {
    pub csv_path: PathBuf,
    pub db_location: PathBuf,
    pub collection_name: String,
}

/// What [`ReviewIndex::open_or_build`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingestion {
    /// The location existed; nothing was inserted.
    Reused,
    /// A fresh snapshot was built with this many documents.
    Built(usize),
}

/// Returns the nearest documents for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `k` documents, most similar first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ReviewDocument>, IndexError>;
}

/// The persisted review index plus the embedder used to query it.
pub struct ReviewIndex {
    store: VectorStore,
    embedder: Arc<dyn Embedder>,
}

impl ReviewIndex {
    /// Opens the index at `source.db_location`, building it from
    /// `source.csv_path` first if the location does not exist.
    pub async fn open_or_build(
        source: &IndexSource,
        embedder: Arc<dyn Embedder>,
    ) -> Result<(Self, Ingestion), IndexError> {
        let (store, ingestion) = if source.db_location.exists() {
            tracing::info!(location = %source.db_location.display(), "index exists, skipping ingestion");
            let store = VectorStore::open(&source.db_location, &source.collection_name)?;
            if store.embed_model() != embedder.model() {
                tracing::warn!(
                    indexed_with = store.embed_model(),
                    configured = embedder.model(),
                    "embedding model differs from the one the index was built with"
                );
            }
            (store, Ingestion::Reused)
        } else {
            let store = ingest(source, embedder.as_ref()).await?;
            let n = store.len();
            (store, Ingestion::Built(n))
        };
        tracing::info!("Vector store ready with {} reviews", store.len());
        Ok((Self { store, embedder }, ingestion))
    }

    /// Wraps an already-loaded store.
    pub fn from_store(store: VectorStore, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Like [`Retriever::retrieve`] but keeps the similarity scores.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<(ReviewDocument, f32)>, IndexError> {
        let query_embedding = self.embedder.embed(query).await?;
        Ok(self.store.search(&query_embedding, k)?)
    }
}

#[async_trait]
impl Retriever for ReviewIndex {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ReviewDocument>, IndexError> {
        let hits = self.search(query, k).await?;
        Ok(hits.into_iter().map(|(doc, _)| doc).collect())
    }
}

/// Reads the CSV, embeds every document and persists them as one snapshot.
/// Nothing is written unless every step succeeds.
async fn ingest(source: &IndexSource, embedder: &dyn Embedder) -> Result<VectorStore, IndexError> {
    let records = load_reviews(&source.csv_path)?;
    let documents = build_documents(&records);
    tracing::info!(
        csv = %source.csv_path.display(),
        documents = documents.len(),
        model = embedder.model(),
        "embedding reviews"
    );

    let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;

    let mut store = VectorStore::new(embedder.model());
    store.add_batch(documents, embeddings)?;
    store.persist(&source.db_location, &source.collection_name)?;
    tracing::info!("Added {} reviews to vector store", store.len());
    Ok(store)
}

/// True if an index has already been written at `location`.
pub fn index_exists(location: &Path) -> bool {
    location.exists()
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("could not load reviews: {0}")]
    DataLoad(#[from] DataLoadError),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendError),
    #[error("index storage error: {0}")]
    Store(#[from] StoreError),
}
