use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use crate::{domain::Message, error::ApiError};

pub const CHAT_ROUTE: &str = "/api/chat";
pub const SYSTEM_ROLE: &str = "system";

/// A `{role, content}` pair as sent to the endpoint and forwarded to the model.
/// Unknown fields on incoming messages are dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(SYSTEM_ROLE, content)
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self::new(message.role.as_str(), message.content.clone())
    }
}

/// Body of `POST /api/chat`. Both fields are optional on the wire; `mode` stays a
/// raw string so the server can apply its own defaulting, and a non-string `mode`
/// reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(
        default,
        deserialize_with = "lenient_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub mode: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

fn lenient_mode<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMode {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match RawMode::deserialize(deserializer)? {
        RawMode::Text(mode) => Some(mode),
        RawMode::Other(_) => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Text(ChatText),
    Error(ApiError),
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        ChatReply::Text(ChatText { text: text.into() })
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ChatReply::Text(_) => 200,
            ChatReply::Error(err) => err.status_code(),
        }
    }
}
