use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::embedder::Embedder;
use super::sqlite::VectorIndex;
use super::store::{RetrievedPassage, Retriever};
use super::RagError;

/// Embeds the query text and searches the in-memory index.
pub struct IndexRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
}

impl IndexRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>) -> Self {
        if let Some(indexed_with) = index.embedding_model() {
            if indexed_with != embedder.model() {
                tracing::warn!(
                    "Index was built with '{}' but queries use '{}'",
                    indexed_with,
                    embedder.model()
                );
            }
        }
        Self { embedder, index }
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedPassage>, RagError> {
        let started = Instant::now();
        let embedding = self.embedder.embed(text).await?;
        let passages = self.index.search(&embedding, k)?;

        tracing::debug!(
            "Retrieved {} passages in {} ms",
            passages.len(),
            started.elapsed().as_millis()
        );
        Ok(passages)
    }

    fn passage_count(&self) -> usize {
        self.index.len()
    }
}
