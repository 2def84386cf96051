//! Question answering: retrieve → render prompt → generate.
//!
//! [`Answerer::try_answer`] reports failures as [`AnswerError`];
//! [`Answerer::answer_question`] is the chat boundary and always returns text.

use std::sync::Arc;

use crate::backend::{BackendError, Generator};
use crate::index::{IndexError, Retriever, RETRIEVAL_K};
use crate::prompt::{render_prompt, EMPTY_QUESTION_REPLY};

/// One prior exchange in a chat session. Accepted for interface
/// compatibility with chat frontends; not used when answering.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub assistant: String,
}

/// Stateless request handler over a retriever and a generator.
#[derive(Clone)]
pub struct Answerer {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
}

impl Answerer {
    pub fn new(retriever: Arc<dyn Retriever>, generator: Arc<dyn Generator>) -> Self {
        Self { retriever, generator }
    }

    /// Answers `question`, turning every failure into `"An error occurred: ..."`.
    pub async fn answer_question(&self, question: &str, _history: &[ChatTurn]) -> String {
        match self.try_answer(question).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(error = %e, "failed to answer question");
                format!("An error occurred: {e}")
            }
        }
    }

    /// Answers `question`. Empty or whitespace-only questions get
    /// [`EMPTY_QUESTION_REPLY`] without touching any backend.
    pub async fn try_answer(&self, question: &str) -> Result<String, AnswerError> {
        if question.trim().is_empty() {
            return Ok(EMPTY_QUESTION_REPLY.to_string());
        }
        let reviews = self
            .retriever
            .retrieve(question, RETRIEVAL_K)
            .await
            .map_err(AnswerError::Retrieval)?;
        tracing::debug!(retrieved = reviews.len(), "retrieved reviews");

        let prompt = render_prompt(&reviews, question);
        self.generator
            .generate(&prompt)
            .await
            .map_err(AnswerError::Generation)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("{0}")]
    Retrieval(IndexError),
    #[error("{0}")]
    Generation(BackendError),
}
