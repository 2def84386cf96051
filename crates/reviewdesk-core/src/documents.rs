//! Turns review records into indexable documents.
//!
//! Document identity is the row position in the CSV. It is only meaningful
//! for the run that built the index.

use serde::{Deserialize, Serialize};

use crate::reviews::ReviewRecord;

/// Metadata copied verbatim from the source row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    pub rating: f64,
    pub date: String,
    pub reviewer: String,
    pub role: String,
    pub company_size: String,
    pub sentiment: String,
}

/// A review ready for embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDocument {
    /// Zero-based CSV row index, as a string.
    pub id: String,
    /// `"{role} - {sentiment} Review {review}"`, the text that gets embedded.
    pub content: String,
    pub metadata: ReviewMetadata,
}

impl ReviewDocument {
    pub fn from_record(row: usize, record: &ReviewRecord) -> Self {
        let title = format!("{} - {} Review", record.role, record.sentiment);
        Self {
            id: row.to_string(),
            content: format!("{} {}", title, record.review),
            metadata: ReviewMetadata {
                rating: record.rating,
                date: record.date.clone(),
                reviewer: record.reviewer.clone(),
                role: record.role.clone(),
                company_size: record.company_size.clone(),
                sentiment: record.sentiment.clone(),
            },
        }
    }
}

/// One document per record, in row order.
pub fn build_documents(records: &[ReviewRecord]) -> Vec<ReviewDocument> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| ReviewDocument::from_record(i, r))
        .collect()
}
