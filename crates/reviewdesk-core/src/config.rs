//! Persisted config (Ollama endpoint, models, corpus and index paths, server
//! address) in the app data directory, or at an explicit path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app_data;

const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBED_MODEL: &str = "mxbai-embed-large";
pub const DEFAULT_CHAT_MODEL: &str = "llama3.2";
pub const DEFAULT_CSV_PATH: &str = "saas_product_reviews.csv";
pub const DEFAULT_DB_LOCATION: &str = "./chroma_langchain_db";
pub const DEFAULT_COLLECTION: &str = "saas_reviews";
pub const DEFAULT_SERVER_NAME: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 7860;
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Ollama server used for both embeddings and completion.
    pub ollama_url: String,
    pub embed_model: String,
    pub chat_model: String,
    /// Review CSV, read only when the index has not been built yet.
    pub csv_path: PathBuf,
    /// Index directory. Its existence means ingestion already happened.
    pub db_location: PathBuf,
    pub collection_name: String,
    /// Max texts per embedding request during ingestion.
    pub embed_batch_size: usize,
    pub server_name: String,
    pub server_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            db_location: PathBuf::from(DEFAULT_DB_LOCATION),
            collection_name: DEFAULT_COLLECTION.to_string(),
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
            server_name: DEFAULT_SERVER_NAME.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl Config {
    /// `host:port` string for binding the chat server.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_name, self.server_port)
    }
}

/// Default config file location: `config.toml` in the app data directory.
pub fn default_config_path() -> Option<PathBuf> {
    app_data::app_data_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Load config from `path`, or from the app data directory when `path` is `None`.
///
/// A missing file yields the default config. A file that exists but can't be
/// read or parsed is an error, so typos don't silently fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read(path.clone(), e))?;
    toml::from_str(&s).map_err(|e| ConfigError::Parse(path, e))
}

/// Save config to `path`, or to the app data directory when `path` is `None`.
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path().ok_or(ConfigError::NoDataDir)?,
    };
    let s = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    std::fs::write(&path, s).map_err(ConfigError::Write)?;
    Ok(path)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine app data directory")]
    NoDataDir,
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("invalid config {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("failed to write config: {0}")]
    Write(std::io::Error),
}
