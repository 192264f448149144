//! Retrieval over the pre-built passage index.
//!
//! - `VectorIndex`: read-only, in-memory copy of the on-disk SQLite index
//! - `Embedder`: turns question text into a query vector
//! - `Retriever`: the narrow capability the answer pipeline depends on

mod embedder;
mod retriever;
mod sqlite;
mod store;

use thiserror::Error;

pub use embedder::{Embedder, HttpEmbedder};
pub use retriever::IndexRetriever;
pub use sqlite::VectorIndex;
pub use store::{RetrievedPassage, Retriever};

#[derive(Debug, Error)]
pub enum RagError {
    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("vector index is corrupt: {0}")]
    CorruptIndex(String),

    #[error("embedding request failed: {0}")]
    Embedding(String),

    #[error("query vector has {actual} dimensions but the index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vectors must not be empty")]
    EmptyVector,
}
