//! Process-wide application context, built once at startup.

use std::sync::Arc;

use crate::answer::Answerer;
use crate::backend::{BackendError, Embedder, Generator};
use crate::config::Config;
use crate::index::{IndexError, IndexSource, Ingestion, ReviewIndex};
use crate::ollama::OllamaClient;

/// Everything a request handler needs: the review index and the answerer
/// built on top of it. Cheap to share behind an `Arc`; nothing in here is
/// mutated after [`AppContext::init`].
pub struct AppContext {
    pub config: Config,
    pub index: Arc<ReviewIndex>,
    pub answerer: Answerer,
    pub ingestion: Ingestion,
}

impl AppContext {
    /// Connects to Ollama and opens (or builds) the review index.
    pub async fn init(config: Config) -> Result<Self, ContextError> {
        let client = Arc::new(OllamaClient::from_config(&config)?);
        Self::with_backends(config, client.clone(), client).await
    }

    /// Same as [`AppContext::init`] with caller-supplied backends.
    pub async fn with_backends(
        config: Config,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self, ContextError> {
        let (index, ingestion) = ReviewIndex::open_or_build(&index_source(&config), embedder).await?;
        let index = Arc::new(index);
        let answerer = Answerer::new(index.clone(), generator);
        Ok(Self {
            config,
            index,
            answerer,
            ingestion,
        })
    }
}

/// Corpus and index paths from `config`.
pub fn index_source(config: &Config) -> IndexSource {
    IndexSource {
        csv_path: config.csv_path.clone(),
        db_location: config.db_location.clone(),
        collection_name: config.collection_name.clone(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeEmbedder, FakeGenerator};

    #[tokio::test]
    async fn init_builds_then_answers() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("reviews.csv");
        std::fs::write(
            &csv_path,
            "role,sentiment,review,rating,date,reviewer,company_size\n\
             Manager,Positive,Great tool,5,2024-01-01,A,50-100\n",
        )
        .unwrap();
        let config = Config {
            csv_path,
            db_location: dir.path().join("db"),
            ..Config::default()
        };
        let generator = Arc::new(FakeGenerator::replying("It's great."));

        let ctx = AppContext::with_backends(config, Arc::new(FakeEmbedder::default()), generator.clone())
            .await
            .unwrap();

        assert_eq!(ctx.ingestion, Ingestion::Built(1));
        assert_eq!(ctx.index.len(), 1);
        assert_eq!(ctx.answerer.answer_question("Is it good?", &[]).await, "It's great.");
        assert!(generator.prompts()[0].contains("Manager - Positive Review Great tool"));
    }

    #[tokio::test]
    async fn init_with_bad_url_fails() {
        let config = Config {
            ollama_url: "::bad::".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            AppContext::init(config).await,
            Err(ContextError::Backend(BackendError::ParseUrl(_)))
        ));
    }
}
