//! Retriever trait — the retrieval capability consumed by the answer pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::RagError;

/// A passage returned for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// The passage text.
    pub content: String,
    /// Source identifier (file name, URL, page, ...).
    pub source: String,
    /// Optional metadata recorded when the index was built.
    pub metadata: Option<serde_json::Value>,
    /// Similarity score (higher = better).
    pub score: f32,
}

impl RetrievedPassage {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            metadata: None,
            score: 0.0,
        }
    }
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns up to `k` passages ranked by similarity to `text`, best first.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedPassage>, RagError>;

    /// Number of passages available, for health reporting.
    fn passage_count(&self) -> usize;
}
