use async_trait::async_trait;

use super::types::{CompletionRequest, CompletionResponse};
use super::LlmError;

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// return the provider name (e.g. "groq")
    fn name(&self) -> &str;

    /// one non-streaming chat completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
