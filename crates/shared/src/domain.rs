use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interaction mode a turn was produced under. Only these four ever reach the
/// prompt orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeTag {
    #[default]
    Chat,
    Study,
    Learn,
    Motivation,
}

impl ModeTag {
    pub const ALL: [ModeTag; 4] = [
        ModeTag::Chat,
        ModeTag::Study,
        ModeTag::Learn,
        ModeTag::Motivation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModeTag::Chat => "chat",
            ModeTag::Study => "study",
            ModeTag::Learn => "learn",
            ModeTag::Motivation => "motivation",
        }
    }

    /// Lenient lookup used on the server boundary: absent or unknown values
    /// resolve to `Chat`.
    pub fn resolve(raw: Option<&str>) -> ModeTag {
        raw.and_then(|value| value.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for ModeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode '{0}'")]
pub struct UnknownMode(pub String);

impl FromStr for ModeTag {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModeTag::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of the client-side conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub mode: ModeTag,
}

impl Message {
    pub fn user(content: impl Into<String>, mode: ModeTag) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            mode,
        }
    }

    pub fn assistant(content: impl Into<String>, mode: ModeTag) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            mode,
        }
    }
}
