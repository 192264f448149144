use thiserror::Error;

use crate::llm::LlmError;
use crate::rag::RagError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load vector index: {0}")]
    Index(#[source] RagError),

    #[error("Failed to initialize embedding client: {0}")]
    Embedder(#[source] RagError),

    #[error("Failed to initialize completion client: {0}")]
    Llm(#[source] LlmError),

    #[error("Failed to load page templates: {0}")]
    Templates(#[source] minijinja::Error),
}
