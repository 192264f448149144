//! Read-only vector index backed by a SQLite file.
//!
//! The file is produced by an external indexing job and holds:
//!
//! ```text
//! rag_chunks(chunk_id TEXT PRIMARY KEY, content TEXT, source TEXT,
//!            metadata TEXT, embedding BLOB)   -- little-endian f32 values
//! rag_meta(key TEXT PRIMARY KEY, value TEXT)   -- optional, 'embedding_model'
//! ```
//!
//! Everything is read into memory once at startup and searched by
//! brute-force cosine similarity.

use std::path::Path;

use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::store::RetrievedPassage;
use super::RagError;
use crate::vector_math::rank_descending_by_cosine;

#[derive(Debug, Clone)]
struct IndexedPassage {
    content: String,
    source: String,
    metadata: Option<Value>,
    embedding: Vec<f32>,
}

#[derive(Debug, Default)]
pub struct VectorIndex {
    passages: Vec<IndexedPassage>,
    dimension: usize,
    embedding_model: Option<String>,
}

impl VectorIndex {
    /// Opens the SQLite index at `path` read-only and loads every embedded
    /// passage in on-disk order.
    pub async fn load_sqlite(path: &Path) -> Result<Self, RagError> {
        if !path.exists() {
            return Err(RagError::IndexUnavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| RagError::IndexUnavailable(format!("{}: {}", path.display(), e)))?;

        let loaded = Self::read_all(&pool).await;
        pool.close().await;
        let index = loaded?;

        tracing::info!(
            "Loaded vector index {} ({} passages, {} dimensions)",
            path.display(),
            index.len(),
            index.dimension
        );
        if index.is_empty() {
            tracing::warn!("Vector index {} has no embedded passages", path.display());
        }

        Ok(index)
    }

    async fn read_all(pool: &SqlitePool) -> Result<Self, RagError> {
        let rows = sqlx::query(
            "SELECT chunk_id, content, source, metadata, embedding
             FROM rag_chunks
             ORDER BY rowid",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| RagError::CorruptIndex(e.to_string()))?;

        let mut passages = Vec::with_capacity(rows.len());
        for row in &rows {
            let chunk_id: String = row
                .try_get("chunk_id")
                .map_err(|e| RagError::CorruptIndex(e.to_string()))?;
            let blob: Option<Vec<u8>> = row
                .try_get("embedding")
                .map_err(|e| RagError::CorruptIndex(e.to_string()))?;
            let Some(blob) = blob.filter(|b| !b.is_empty()) else {
                tracing::debug!("Skipping chunk {} without embedding", chunk_id);
                continue;
            };

            let embedding = deserialize_embedding(&blob).ok_or_else(|| {
                RagError::CorruptIndex(format!(
                    "chunk {} has a {}-byte embedding, not a multiple of 4",
                    chunk_id,
                    blob.len()
                ))
            })?;

            let metadata = row
                .try_get::<Option<String>, _>("metadata")
                .ok()
                .flatten()
                .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
                .filter(|value| !matches!(value, Value::Object(map) if map.is_empty()));

            passages.push(IndexedPassage {
                content: row
                    .try_get("content")
                    .map_err(|e| RagError::CorruptIndex(e.to_string()))?,
                source: row
                    .try_get::<Option<String>, _>("source")
                    .ok()
                    .flatten()
                    .unwrap_or_default(),
                metadata,
                embedding,
            });
        }

        let embedding_model: Option<String> =
            sqlx::query_scalar("SELECT value FROM rag_meta WHERE key = 'embedding_model'")
                .fetch_optional(pool)
                .await
                .ok()
                .flatten();

        let mut index = Self::from_parts(passages)?;
        index.embedding_model = embedding_model;
        Ok(index)
    }

    /// Builds an index from `(content, source, embedding)` triples.
    pub fn from_entries<I, C, S>(entries: I) -> Result<Self, RagError>
    where
        I: IntoIterator<Item = (C, S, Vec<f32>)>,
        C: Into<String>,
        S: Into<String>,
    {
        let passages = entries
            .into_iter()
            .map(|(content, source, embedding)| IndexedPassage {
                content: content.into(),
                source: source.into(),
                metadata: None,
                embedding,
            })
            .collect();
        Self::from_parts(passages)
    }

    fn from_parts(passages: Vec<IndexedPassage>) -> Result<Self, RagError> {
        let dimension = passages.first().map(|p| p.embedding.len()).unwrap_or(0);
        if let Some(bad) = passages
            .iter()
            .find(|p| p.embedding.len() != dimension)
        {
            return Err(RagError::CorruptIndex(format!(
                "mixed embedding dimensions: {} and {}",
                dimension,
                bad.embedding.len()
            )));
        }

        Ok(Self {
            passages,
            dimension,
            embedding_model: None,
        })
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedding model recorded by the indexing job, if any.
    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }

    /// Returns the `k` passages most similar to `query_embedding`.
    pub fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedPassage>, RagError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query_embedding.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query_embedding.len(),
            });
        }

        let candidates: Vec<&[f32]> = self
            .passages
            .iter()
            .map(|p| p.embedding.as_slice())
            .collect();
        let ranked = rank_descending_by_cosine(query_embedding, &candidates)?;

        Ok(ranked
            .into_iter()
            .take(k)
            .map(|(idx, score)| {
                let passage = &self.passages[idx];
                RetrievedPassage {
                    content: passage.content.clone(),
                    source: passage.source.clone(),
                    metadata: passage.metadata.clone(),
                    score,
                }
            })
            .collect())
    }
}

fn deserialize_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    async fn write_fixture(
        dir: &tempfile::TempDir,
        rows: &[(&str, &str, &str, Option<Vec<f32>>)],
        embedding_model: Option<&str>,
    ) -> PathBuf {
        let path = dir.path().join("index.db");
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE rag_chunks (
                chunk_id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                metadata TEXT DEFAULT '{}',
                embedding BLOB
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("CREATE TABLE rag_meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();

        for (id, content, source, embedding) in rows {
            sqlx::query(
                "INSERT INTO rag_chunks (chunk_id, content, source, embedding)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(*id)
            .bind(*content)
            .bind(*source)
            .bind(embedding.as_deref().map(serialize_embedding))
            .execute(&pool)
            .await
            .unwrap();
        }

        if let Some(model) = embedding_model {
            sqlx::query("INSERT INTO rag_meta (key, value) VALUES ('embedding_model', ?1)")
                .bind(model)
                .execute(&pool)
                .await
                .unwrap();
        }

        pool.close().await;
        path
    }

    #[tokio::test]
    async fn loads_passages_and_ranks_by_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            &[
                ("c1", "Influenza is a viral infection.", "flu.pdf", Some(vec![1.0, 0.0, 0.0])),
                ("c2", "Aspirin thins the blood.", "drugs.pdf", Some(vec![0.0, 1.0, 0.0])),
                ("c3", "Flu shots are yearly.", "flu.pdf", Some(vec![0.9, 0.1, 0.0])),
            ],
            Some("sentence-transformers/all-MiniLM-L6-v2"),
        )
        .await;

        let index = VectorIndex::load_sqlite(&path).await.unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimension(), 3);
        assert_eq!(
            index.embedding_model(),
            Some("sentence-transformers/all-MiniLM-L6-v2")
        );

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        let contents: Vec<&str> = results.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["Influenza is a viral infection.", "Flu shots are yearly."]
        );
        assert_eq!(results[0].source, "flu.pdf");
        assert!(results[0].score > 0.99);
    }

    #[tokio::test]
    async fn repeated_queries_return_the_same_ordered_passages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            &[
                ("c1", "A", "s", Some(vec![1.0, 1.0])),
                ("c2", "B", "s", Some(vec![1.0, 1.0])),
                ("c3", "C", "s", Some(vec![0.5, 1.0])),
            ],
            None,
        )
        .await;
        let index = VectorIndex::load_sqlite(&path).await.unwrap();

        let first = index.search(&[1.0, 1.0], 3).unwrap();
        let second = index.search(&[1.0, 1.0], 3).unwrap();

        assert_eq!(first, second);
        let contents: Vec<&str> = first.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn rows_without_embeddings_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            &[
                ("c1", "kept", "s", Some(vec![1.0])),
                ("c2", "skipped", "s", None),
            ],
            None,
        )
        .await;

        let index = VectorIndex::load_sqlite(&path).await.unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.embedding_model().is_none());
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = VectorIndex::load_sqlite(&dir.path().join("nope.db"))
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn file_without_chunk_table_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        let pool = SqlitePoolOptions::new()
            .connect_with(SqliteConnectOptions::new().filename(&path).create_if_missing(true))
            .await
            .unwrap();
        sqlx::query("CREATE TABLE other (id INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let err = VectorIndex::load_sqlite(&path).await.unwrap_err();
        assert!(matches!(err, RagError::CorruptIndex(_)));
    }

    #[tokio::test]
    async fn mixed_dimensions_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            &[
                ("c1", "a", "s", Some(vec![1.0, 0.0])),
                ("c2", "b", "s", Some(vec![1.0, 0.0, 0.0])),
            ],
            None,
        )
        .await;

        let err = VectorIndex::load_sqlite(&path).await.unwrap_err();
        assert!(matches!(err, RagError::CorruptIndex(_)));
    }

    #[test]
    fn query_with_wrong_dimension_fails() {
        let index = VectorIndex::from_entries(vec![("a", "s", vec![1.0, 0.0])]).unwrap();
        let err = index.search(&[1.0, 0.0, 0.0], 4).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn search_truncates_to_k() {
        let index = VectorIndex::from_entries(
            (0..10).map(|i| (format!("p{}", i), "s".to_string(), vec![1.0, i as f32])),
        )
        .unwrap();
        assert_eq!(index.search(&[1.0, 0.0], 4).unwrap().len(), 4);
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = VectorIndex::default();
        assert!(index.search(&[1.0], 4).unwrap().is_empty());
    }

    #[test]
    fn odd_sized_blob_is_rejected() {
        assert!(deserialize_embedding(&[0, 0, 128]).is_none());
        assert_eq!(
            deserialize_embedding(&1.5f32.to_le_bytes()),
            Some(vec![1.5])
        );
    }
}
