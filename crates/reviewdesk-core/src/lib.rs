//! All backend logic independent of how ReviewDesk is run (CLI or HTTP chat).
//!
//! The review corpus is a CSV; its embeddings live in a persisted index
//! directory. Embeddings and answers come from a local Ollama server.

pub mod answer;
pub mod app_data;
pub mod backend;
pub mod config;
pub mod context;
pub mod documents;
pub mod index;
pub mod logging;
pub mod ollama;
pub mod prompt;
pub mod reviews;
pub mod store;

#[cfg(test)]
mod test_support;

pub use answer::{AnswerError, Answerer, ChatTurn};
pub use app_data::app_data_dir;
pub use backend::{BackendError, Embedder, Generator};
pub use config::{load_config, save_config, Config, ConfigError};
pub use context::{AppContext, ContextError};
pub use documents::{build_documents, ReviewDocument, ReviewMetadata};
pub use index::{index_exists, IndexError, IndexSource, Ingestion, Retriever, ReviewIndex, RETRIEVAL_K};
pub use ollama::OllamaClient;
pub use prompt::{render_prompt, EMPTY_QUESTION_REPLY, PRODUCT_NAME};
pub use reviews::{load_reviews, DataLoadError, ReviewRecord};
pub use store::{StoreError, VectorStore};

/// Version of the core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
