use std::sync::Arc;

use completion::{CompletionService, ServiceError};
use shared::{
    domain::ModeTag,
    error::ApiError,
    protocol::{ChatMessage, ChatReply, ChatRequest},
};
use thiserror::Error;
use tracing::{error, info, warn};

pub mod persona;

pub use persona::{instruction_block, instruction_for, system_prompt, BASE_PERSONA};

pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-5";
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-4";

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),
    #[error("invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),
    #[error("no model tiers configured")]
    NoModels,
    #[error("all model tiers failed; last model {model}: {source}")]
    Exhausted {
        model: String,
        #[source]
        source: ServiceError,
    },
}

impl OrchestratorError {
    /// Client-visible body. Service detail never leaves the server.
    pub fn to_api_error(&self) -> ApiError {
        match self {
            OrchestratorError::MethodNotAllowed(_) => ApiError::method_not_allowed(),
            OrchestratorError::InvalidBody(_) => ApiError::invalid_body(),
            OrchestratorError::NoModels | OrchestratorError::Exhausted { .. } => {
                ApiError::internal()
            }
        }
    }
}

/// Builds the mode-conditioned prompt and walks the model tiers in order until one
/// answers. Holds no per-request state.
#[derive(Clone)]
pub struct PromptOrchestrator {
    service: Arc<dyn CompletionService>,
    models: Vec<String>,
}

impl PromptOrchestrator {
    pub fn new(service: Arc<dyn CompletionService>, models: Vec<String>) -> Self {
        Self { service, models }
    }

    pub fn with_fallback(
        service: Arc<dyn CompletionService>,
        primary: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self::new(service, vec![primary.into(), fallback.into()])
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Endpoint contract: verb check, body parsing, completion, response shaping.
    pub async fn handle(&self, method: &str, body: &[u8]) -> ChatReply {
        match self.handle_inner(method, body).await {
            Ok(text) => ChatReply::text(text),
            Err(err) => ChatReply::Error(err.to_api_error()),
        }
    }

    async fn handle_inner(&self, method: &str, body: &[u8]) -> Result<String, OrchestratorError> {
        if method != "POST" {
            return Err(OrchestratorError::MethodNotAllowed(method.to_string()));
        }
        let request = parse_request(body).map_err(|err| {
            warn!(error = %err, "rejecting malformed chat request");
            err
        })?;
        self.complete(&request).await
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<String, OrchestratorError> {
        let mode = ModeTag::resolve(request.mode.as_deref());
        let messages = build_messages(mode, &request.messages);

        let mut last_failure = None;
        for (tier, model) in self.models.iter().enumerate() {
            match self.service.generate(model, &messages).await {
                Ok(completion) => {
                    info!(%model, tier, %mode, "completion succeeded");
                    return Ok(completion.first_text().trim().to_string());
                }
                Err(err) => {
                    if tier + 1 < self.models.len() {
                        warn!(%model, tier, error = %err, "model call failed; trying next tier");
                    } else {
                        error!(%model, tier, error = %err, "chat completion failed on last tier");
                    }
                    last_failure = Some((model.clone(), err));
                }
            }
        }

        match last_failure {
            Some((model, source)) => Err(OrchestratorError::Exhausted { model, source }),
            None => {
                error!("chat completion requested with no model tiers configured");
                Err(OrchestratorError::NoModels)
            }
        }
    }
}

pub fn parse_request(body: &[u8]) -> Result<ChatRequest, OrchestratorError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ChatRequest::default());
    }
    serde_json::from_slice(body).map_err(OrchestratorError::InvalidBody)
}

/// System message first, then the conversation reduced to `{role, content}`.
pub fn build_messages(mode: ModeTag, conversation: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(ChatMessage::system(system_prompt(mode)));
    messages.extend(
        conversation
            .iter()
            .map(|m| ChatMessage::new(m.role.clone(), m.content.clone())),
    );
    messages
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
