//! Loading review records from the corpus CSV.
//!
//! The file must have a header row with at least the columns in
//! [`REQUIRED_COLUMNS`]; extra columns are ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "role",
    "sentiment",
    "review",
    "rating",
    "date",
    "reviewer",
    "company_size",
];

/// One row of the review corpus.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewRecord {
    pub role: String,
    pub sentiment: String,
    pub review: String,
    pub rating: f64,
    pub date: String,
    pub reviewer: String,
    pub company_size: String,
}

/// Reads every row of the CSV at `path`, in file order.
pub fn load_reviews(path: &Path) -> Result<Vec<ReviewRecord>, DataLoadError> {
    let file = std::fs::File::open(path).map_err(|e| DataLoadError::Open(path.to_path_buf(), e))?;
    read_reviews(file, path)
}

fn read_reviews<R: std::io::Read>(input: R, path: &Path) -> Result<Vec<ReviewRecord>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| DataLoadError::Parse(path.to_path_buf(), e))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns(path.to_path_buf(), missing.join(", ")));
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<ReviewRecord>() {
        records.push(row.map_err(|e| DataLoadError::Parse(path.to_path_buf(), e))?);
    }
    Ok(records)
}

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("cannot open review file {0}: {1}")]
    Open(PathBuf, std::io::Error),
    #[error("review file {0} is missing required columns: {1}")]
    MissingColumns(PathBuf, String),
    #[error("malformed review file {0}: {1}")]
    Parse(PathBuf, csv::Error),
}
