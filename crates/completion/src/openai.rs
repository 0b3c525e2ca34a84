use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shared::protocol::ChatMessage;
use tracing::debug;

use crate::{Completion, CompletionService, ServiceError};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const MAX_ERROR_DETAIL_CHARS: usize = 800;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// A missing API key is only reported when `generate` is called, so the server can
/// start without credentials.
pub struct OpenAiCompletionService {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiCompletionService {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    async fn generate(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, ServiceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ServiceError::MissingCredential)?;

        debug!(model, message_count = messages.len(), "requesting completion");
        let res = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&ChatCompletionRequest {
                model,
                messages,
                temperature: self.config.temperature,
            })
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                detail: body.chars().take(MAX_ERROR_DETAIL_CHARS).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
