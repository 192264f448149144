use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::RagError;

#[async_trait]
pub trait Embedder: Send + Sync {
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;
}

/// Client for an OpenAI-compatible `/embeddings` endpoint serving the
/// sentence-transformer the index was built with.
#[derive(Clone)]
pub struct HttpEmbedder {
    base_url: String,
    model: String,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: [text],
        };

        let res = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!("{}: {}", status, text)));
        }

        let payload: EmbeddingResponse = res
            .json()
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        first_embedding(payload)
    }
}

fn first_embedding(payload: EmbeddingResponse) -> Result<Vec<f32>, RagError> {
    payload
        .data
        .into_iter()
        .next()
        .map(|item| item.embedding)
        .filter(|embedding| !embedding.is_empty())
        .ok_or_else(|| RagError::Embedding("response contained no embedding".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_openai_shape() {
        let body = EmbeddingRequest {
            model: "sentence-transformers/all-MiniLM-L6-v2",
            input: ["what causes fever?"],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "sentence-transformers/all-MiniLM-L6-v2",
                "input": ["what causes fever?"]
            })
        );
    }

    #[test]
    fn first_embedding_is_extracted() {
        let payload: EmbeddingResponse = serde_json::from_str(
            r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.5,-0.25]}]}"#,
        )
        .unwrap();
        assert_eq!(first_embedding(payload).unwrap(), vec![0.5, -0.25]);
    }

    #[test]
    fn empty_data_is_an_embedding_error() {
        let payload: EmbeddingResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(matches!(
            first_embedding(payload),
            Err(RagError::Embedding(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let embedder =
            HttpEmbedder::new("http://localhost:8080/v1/", "m", Duration::from_secs(1)).unwrap();
        assert_eq!(embedder.endpoint(), "http://localhost:8080/v1/embeddings");
        assert_eq!(embedder.model(), "m");
    }
}
