use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::provider::CompletionClient;
use super::types::{ChatMessage, CompletionRequest, CompletionResponse};
use super::LlmError;
use crate::core::config::Credential;

/// Groq's OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct GroqClient {
    base_url: String,
    api_key: Credential,
    client: Client,
}

#[derive(Serialize)]
pub(crate) struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    stream: bool,
}

impl<'a> ChatCompletionBody<'a> {
    pub(crate) fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            stream: false,
        }
    }
}

impl GroqClient {
    pub fn new(base_url: &str, api_key: Credential, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub(crate) fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let started = Instant::now();
        let body = ChatCompletionBody::from_request(&request);

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let payload: CompletionResponse = res.json().await.map_err(LlmError::from_transport)?;

        let finish_reason = payload
            .choices
            .first()
            .and_then(|choice| choice.finish_reason.as_deref())
            .unwrap_or("none");
        match payload.usage {
            Some(usage) => tracing::debug!(
                "{} completion in {} ms, finish_reason={} ({} prompt / {} completion tokens)",
                request.model,
                started.elapsed().as_millis(),
                finish_reason,
                usage.prompt_tokens,
                usage.completion_tokens
            ),
            None => tracing::debug!(
                "{} completion in {} ms, finish_reason={}",
                request.model,
                started.elapsed().as_millis(),
                finish_reason
            ),
        }

        Ok(payload)
    }
}
