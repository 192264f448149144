//! The answer pipeline: retrieve, prompt, complete, extend history.

pub mod prompt;


use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::core::config::AppConfig;
use crate::history::{with_exchange, History, Turn};
use crate::llm::{ChatMessage, CompletionClient, CompletionRequest, LlmError};
use crate::rag::{RagError, Retriever};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("retrieval failed: {0}")]
    RetrievalFailure(#[source] RagError),

    #[error("completion failed: {0}")]
    CompletionFailure(#[source] LlmError),
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub temperature: f64,
    pub top_k: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.completion.model.clone(),
            temperature: config.completion.temperature,
            top_k: config.retrieval.top_k,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        use crate::core::config::defaults::{
            DEFAULT_COMPLETION_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TOP_K,
        };
        Self {
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Result of one successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub history: History,
}

#[derive(Clone)]
pub struct AnswerPipeline {
    retriever: Arc<dyn Retriever>,
    completion: Arc<dyn CompletionClient>,
    settings: PipelineSettings,
}

impl AnswerPipeline {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        completion: Arc<dyn CompletionClient>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            retriever,
            completion,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn retriever(&self) -> &dyn Retriever {
        self.retriever.as_ref()
    }

    /// Answers `question` in the context of `history`.
    ///
    /// `history` is left untouched; the returned [`Answer`] carries a copy
    /// extended by the user question and the assistant reply. Nothing is
    /// retried and no outbound call is made for an empty question.
    pub async fn answer(&self, question: &str, history: &[Turn]) -> Result<Answer, PipelineError> {
        if question.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        let started = Instant::now();

        let passages = self
            .retriever
            .query(question, self.settings.top_k)
            .await
            .map_err(PipelineError::RetrievalFailure)?;

        let prompt = prompt::build_prompt(history, &passages, question);
        let request =
            CompletionRequest::new(self.settings.model.as_str(), vec![ChatMessage::user(prompt)])
                .with_temperature(self.settings.temperature);

        let text = self
            .completion
            .complete(request)
            .await
            .and_then(|response| response.into_first_content())
            .map_err(PipelineError::CompletionFailure)?;

        tracing::info!(
            "Answered question ({} chars, {} prior turns, {} passages) via {} in {} ms",
            question.chars().count(),
            history.len(),
            passages.len(),
            self.completion.name(),
            started.elapsed().as_millis()
        );

        let history = with_exchange(history, question, &text);
        Ok(Answer { text, history })
    }
}
