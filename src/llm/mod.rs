pub mod groq;
pub mod provider;
pub mod types;


use thiserror::Error;

pub use groq::GroqClient;
pub use provider::CompletionClient;
pub use types::{ChatMessage, CompletionRequest, CompletionResponse};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request timed out")]
    Timeout,

    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid completion response: {0}")]
    Decode(String),

    #[error("completion service returned no choices")]
    EmptyChoices,
}

impl LlmError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::Decode(err.to_string())
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}
