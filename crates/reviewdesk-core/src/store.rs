//! Vector store for review embeddings. Brute-force cosine search over
//! normalized vectors, persisted as one JSON snapshot per collection.
//!
//! A snapshot is written once. [`VectorStore::persist`] stages the whole
//! directory next to the target and renames it into place, so the index
//! location either holds a complete snapshot or doesn't exist.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::documents::ReviewDocument;

/// A document with its embedding, stored for similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub document: ReviewDocument,
    /// Normalized embedding vector (unit length for cosine similarity via dot product).
    embedding: Vec<f32>,
}

/// Document store with similarity search.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VectorStore {
    /// Embedding model the vectors came from.
    embed_model: String,
    /// Length of every stored vector. Zero until the first batch is added.
    dimension: usize,
    items: Vec<IndexedDocument>,
}

impl VectorStore {
    pub fn new(embed_model: impl Into<String>) -> Self {
        Self {
            embed_model: embed_model.into(),
            dimension: 0,
            items: Vec::new(),
        }
    }

    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Add documents with their embeddings in one batch. Embeddings are
    /// normalized before storage. Every embedding must have the store's
    /// dimension; the first batch sets it.
    pub fn add_batch(
        &mut self,
        documents: Vec<ReviewDocument>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<(), StoreError> {
        if documents.len() != embeddings.len() {
            return Err(StoreError::LengthMismatch {
                documents: documents.len(),
                embeddings: embeddings.len(),
            });
        }
        let dimension = if self.items.is_empty() {
            embeddings.first().map_or(0, Vec::len)
        } else {
            self.dimension
        };
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension || e.is_empty()) {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                received: bad.len(),
            });
        }
        self.dimension = dimension;
        self.items.extend(
            documents
                .into_iter()
                .zip(embeddings)
                .map(|(document, embedding)| IndexedDocument {
                    document,
                    embedding: normalize(&embedding),
                }),
        );
        Ok(())
    }

    /// Search for documents most similar to the query embedding. Returns up
    /// to k results with cosine similarity scores, highest first. A query of
    /// the wrong dimension is an error, not a truncated comparison.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<(ReviewDocument, f32)>, StoreError> {
        if self.items.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query_embedding.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                received: query_embedding.len(),
            });
        }
        let q_norm = normalize(query_embedding);
        let mut scored: Vec<(&IndexedDocument, f32)> = self
            .items
            .iter()
            .map(|item| (item, dot(&q_norm, &item.embedding)))
            .collect();
        // Stable sort keeps row order among equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(item, score)| (item.document.clone(), score))
            .collect())
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Write the store as collection `collection` into the directory
    /// `location`, which must not exist yet.
    pub fn persist(&self, location: &Path, collection: &str) -> Result<(), StoreError> {
        if location.exists() {
            return Err(StoreError::AlreadyExists(location.to_path_buf()));
        }
        let staging = staging_dir(location);
        if staging.exists() {
            std::fs::remove_dir_all(&staging).map_err(|e| StoreError::Io(staging.clone(), e))?;
        }
        std::fs::create_dir_all(&staging).map_err(|e| StoreError::Io(staging.clone(), e))?;

        let file = staging.join(snapshot_file_name(collection));
        let written = serde_json::to_vec(self)
            .map_err(|e| StoreError::Encode(file.clone(), e))
            .and_then(|bytes| std::fs::write(&file, bytes).map_err(|e| StoreError::Io(file.clone(), e)))
            .and_then(|_| {
                std::fs::rename(&staging, location).map_err(|e| StoreError::Io(location.to_path_buf(), e))
            });
        if written.is_err() {
            let _ = std::fs::remove_dir_all(&staging);
        }
        written
    }

    /// Load collection `collection` from the directory `location`.
    pub fn open(location: &Path, collection: &str) -> Result<Self, StoreError> {
        let file = location.join(snapshot_file_name(collection));
        if !file.is_file() {
            return Err(StoreError::MissingCollection(
                location.to_path_buf(),
                collection.to_string(),
            ));
        }
        let bytes = std::fs::read(&file).map_err(|e| StoreError::Io(file.clone(), e))?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(file, e))
    }
}

fn snapshot_file_name(collection: &str) -> String {
    format!("{collection}.json")
}

fn staging_dir(location: &Path) -> PathBuf {
    let mut name = location
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    location.with_file_name(name)
}

fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / norm).collect()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("got {documents} documents but {embeddings} embeddings")]
    LengthMismatch { documents: usize, embeddings: usize },
    #[error("embedding dimension mismatch: index uses {expected}, got {received}")]
    DimensionMismatch { expected: usize, received: usize },
    #[error("index location already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("index at {0} has no collection named {1:?}")]
    MissingCollection(PathBuf, String),
    #[error("I/O error at {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("failed to encode index {0}: {1}")]
    Encode(PathBuf, serde_json::Error),
    #[error("corrupt index {0}: {1}")]
    Decode(PathBuf, serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::ReviewMetadata;

    fn doc(id: &str) -> ReviewDocument {
        ReviewDocument {
            id: id.to_string(),
            content: format!("review {id}"),
            metadata: ReviewMetadata {
                rating: 4.0,
                date: "2024-03-01".to_string(),
                reviewer: "R".to_string(),
                role: "Developer".to_string(),
                company_size: "10-50".to_string(),
                sentiment: "Neutral".to_string(),
            },
        }
    }

    fn sample() -> VectorStore {
        let mut store = VectorStore::new("test-embed");
        store
            .add_batch(
                vec![doc("0"), doc("1"), doc("2")],
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
            )
            .unwrap();
        store
    }

    #[test]
    fn search_orders_by_similarity() {
        let store = sample();
        let hits = store.search(&[2.0, 0.1], 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|(d, _)| d.id.as_str()).collect();
        assert_eq!(ids, ["0", "2", "1"]);
        assert!(hits[0].1 >= hits[1].1 && hits[1].1 >= hits[2].1);
    }

    #[test]
    fn search_caps_at_k() {
        let store = sample();
        assert_eq!(store.search(&[0.0, 1.0], 2).unwrap().len(), 2);
        assert_eq!(store.search(&[0.0, 1.0], 10).unwrap().len(), 3);
        assert!(store.search(&[0.0, 1.0], 0).unwrap().is_empty());
        assert!(VectorStore::new("m").search(&[1.0], 5).unwrap().is_empty());
    }

    #[test]
    fn mismatched_batch_is_rejected() {
        let mut store = VectorStore::new("m");
        let err = store.add_batch(vec![doc("0")], vec![]).unwrap_err();
        assert!(matches!(err, StoreError::LengthMismatch { documents: 1, embeddings: 0 }));
        assert!(store.is_empty());
    }

    #[test]
    fn ragged_batch_is_rejected() {
        let mut store = VectorStore::new("m");
        let err = store
            .add_batch(vec![doc("0"), doc("1")], vec![vec![1.0, 0.0], vec![0.0, 1.0, 5.0]])
            .unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { expected: 2, received: 3 }));
        assert!(store.is_empty());

        let mut store = sample();
        let err = store.add_batch(vec![doc("3")], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { expected: 2, received: 1 }));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn query_of_wrong_dimension_is_rejected() {
        let store = sample();
        assert_eq!(store.dimension(), 2);
        let err = store.search(&[0.0, 0.0, 1.0, 0.0], 2).unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { expected: 2, received: 4 }));
        assert!(store.search(&[], 2).is_err());
    }

    #[test]
    fn persist_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("db");
        sample().persist(&location, "saas_reviews").unwrap();

        assert!(location.join("saas_reviews.json").is_file());
        assert!(!staging_dir(&location).exists());

        let reopened = VectorStore::open(&location, "saas_reviews").unwrap();
        assert_eq!(reopened.len(), 3);
        assert_eq!(reopened.embed_model(), "test-embed");
        assert_eq!(reopened.dimension(), 2);
        assert_eq!(reopened.search(&[0.0, 1.0], 1).unwrap()[0].0.id, "1");

        let raw = std::fs::read_to_string(location.join("saas_reviews.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["dimension"], 2);
    }

    #[test]
    fn persist_clears_stale_staging_dir() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("db");
        let staging = staging_dir(&location);
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join("leftover.json"), "{").unwrap();

        sample().persist(&location, "saas_reviews").unwrap();

        assert!(!staging.exists());
        assert!(!location.join("leftover.json").exists());
        assert_eq!(VectorStore::open(&location, "saas_reviews").unwrap().len(), 3);
    }

    #[test]
    fn failed_persist_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("db");

        // The collection names a subdirectory that doesn't exist, so the write fails.
        let err = sample().persist(&location, "missing/saas_reviews").unwrap_err();

        assert!(matches!(err, StoreError::Io(_, _)));
        assert!(!staging_dir(&location).exists());
        assert!(!location.exists());
    }

    #[test]
    fn persist_refuses_existing_location() {
        let dir = tempfile::tempdir().unwrap();
        let err = sample().persist(dir.path(), "c").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn open_unknown_collection() {
        let dir = tempfile::tempdir().unwrap();
        let err = VectorStore::open(dir.path(), "other").unwrap_err();
        assert!(matches!(err, StoreError::MissingCollection(_, _)));
    }
}
