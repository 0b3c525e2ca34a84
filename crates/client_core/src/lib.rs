use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{ChatRequest, CHAT_ROUTE};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub mod calendar;
pub mod conversation;
pub mod mode;
pub mod preferences;
pub mod theme;

pub use conversation::{
    ConversationState, PendingSend, SendBlocker, SendOutcome, EMPTY_REPLY_APOLOGY,
    THINKING_TEXT, TRANSPORT_APOLOGY,
};
pub use mode::Mode;
pub use preferences::Preferences;
pub use theme::{ThemeId, ThemePalette};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Carries one chat turn to the prompt endpoint.
///
/// Resolves to the reply's `text` field when it is a JSON string, `None` when the
/// body parsed but carries no text (for example an `{ "error": .. }` body).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_chat(&self, request: ChatRequest) -> Result<Option<String>, TransportError>;
}

pub struct HttpChatTransport {
    http: Client,
    endpoint: Url,
}

impl HttpChatTransport {
    pub fn new(server_url: &str) -> Result<Self, TransportError> {
        let endpoint = Url::parse(server_url)?.join(CHAT_ROUTE)?;
        Ok(Self {
            http: Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send_chat(&self, request: ChatRequest) -> Result<Option<String>, TransportError> {
        debug!(
            endpoint = %self.endpoint,
            messages = request.messages.len(),
            "sending chat request"
        );
        // The status code is not consulted: error bodies are still JSON and simply
        // lack a `text` field.
        let res = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;
        let bytes = res.bytes().await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(body
            .get("text")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
