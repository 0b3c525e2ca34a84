use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::protocol::ChatMessage;
use thiserror::Error;

mod openai;

pub use openai::{OpenAiCompletionService, OpenAiConfig, DEFAULT_OPENAI_BASE_URL};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("completion service credential is not configured")]
    MissingCredential,
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion service returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("malformed completion response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl Completion {
    /// Single-choice completion, mostly useful for stand-in services.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                message: Some(CompletionMessage {
                    content: Some(text.into()),
                }),
            }],
        }
    }

    /// Content of the first choice, or `""` when the service returned none.
    pub fn first_text(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, ServiceError>;
}

#[cfg(test)]
#[path = "tests/openai_tests.rs"]
mod tests;
