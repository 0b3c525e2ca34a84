use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use shared::{
    domain::{Message, ModeTag},
    protocol::{ChatMessage, ChatRequest},
};
use storage::KeyValueStore;
use tracing::{debug, warn};

use crate::{
    calendar::{civil_date, is_birthday},
    mode::Mode,
    preferences::{save_notes, save_theme, Preferences},
    theme::{ThemeId, ThemePalette},
    ChatTransport, TransportError,
};

pub const EMPTY_REPLY_APOLOGY: &str = "Sorry, I ran into an error. Please try again later.";
pub const TRANSPORT_APOLOGY: &str = "Sorry, I ran into an error.";
pub const THINKING_TEXT: &str = "Aurora is thinking...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendBlocker {
    EmptyInput,
    InFlight,
    NotesMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Skipped(SendBlocker),
    Answered,
    Apologized,
}

/// A request that has been recorded in the log but not yet resolved. Must be handed
/// back to [`ConversationState::complete_send`].
#[derive(Debug)]
#[must_use = "a pending send keeps the conversation loading until completed"]
pub struct PendingSend {
    mode: ModeTag,
    request: ChatRequest,
}

impl PendingSend {
    pub fn mode(&self) -> ModeTag {
        self.mode
    }

    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

/// Client-side conversation controller: active mode, message log, input buffer,
/// the single in-flight request and persisted preferences.
pub struct ConversationState {
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn ChatTransport>,
    mode: Mode,
    messages: Vec<Message>,
    input: String,
    in_flight: Option<ModeTag>,
    preferences: Preferences,
    started_on: NaiveDate,
}

impl ConversationState {
    pub async fn initialize(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self> {
        Self::initialize_at(store, transport, Utc::now()).await
    }

    /// Loads preferences once and writes the resolved theme back, so an unknown
    /// stored theme is normalized to the default.
    pub async fn initialize_at(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn ChatTransport>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let preferences = Preferences::load(store.as_ref()).await?;
        save_theme(store.as_ref(), preferences.theme).await?;
        debug!(theme = %preferences.theme, "conversation state initialized");

        Ok(Self {
            store,
            transport,
            mode: Mode::default(),
            messages: Vec::new(),
            input: String::new(),
            in_flight: None,
            preferences,
            started_on: civil_date(now),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn show_birthday(&self) -> bool {
        is_birthday(self.started_on)
    }

    pub fn theme(&self) -> ThemeId {
        self.preferences.theme
    }

    pub fn palette(&self) -> ThemePalette {
        self.preferences.theme.palette()
    }

    pub fn notes_text(&self) -> &str {
        &self.preferences.notes_text
    }

    pub fn notes_saved_at(&self) -> Option<DateTime<Utc>> {
        self.preferences.notes_saved_at
    }

    pub fn notes_saved_label(&self) -> String {
        match self.preferences.notes_saved_at {
            Some(at) => format!(
                "Last saved: {}",
                at.with_timezone(&Local).format("%-m/%-d/%Y, %-I:%M:%S %p")
            ),
            None => "Not yet saved".to_string(),
        }
    }

    /// Placeholder bubble shown while a request is outstanding.
    pub fn thinking_indicator(&self) -> Option<(Mode, &'static str)> {
        self.is_loading().then_some((self.mode, THINKING_TEXT))
    }

    pub fn transport(&self) -> Arc<dyn ChatTransport> {
        Arc::clone(&self.transport)
    }

    pub fn send_blocker(&self) -> Option<SendBlocker> {
        if self.input.trim().is_empty() {
            Some(SendBlocker::EmptyInput)
        } else if self.is_loading() {
            Some(SendBlocker::InFlight)
        } else if self.mode == Mode::Notes {
            Some(SendBlocker::NotesMode)
        } else {
            None
        }
    }

    /// History is kept across mode switches. Entering notes re-saves the notes
    /// text with a fresh timestamp.
    pub async fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.mode = mode;
        if mode == Mode::Notes {
            self.persist_notes().await?;
        }
        Ok(())
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub async fn set_theme(&mut self, theme: ThemeId) -> Result<()> {
        self.preferences.theme = theme;
        save_theme(self.store.as_ref(), theme).await
    }

    /// Persisted on every call, but only while the notes surface is active.
    pub async fn set_notes_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.preferences.notes_text = text.into();
        if self.mode == Mode::Notes {
            self.persist_notes().await?;
        }
        Ok(())
    }

    async fn persist_notes(&mut self) -> Result<()> {
        let saved_at = Utc::now();
        save_notes(self.store.as_ref(), &self.preferences.notes_text, saved_at).await?;
        self.preferences.notes_saved_at = Some(saved_at);
        Ok(())
    }

    /// Records the user turn and marks the conversation as loading. Returns `None`
    /// when sending is currently blocked.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        if let Some(blocker) = self.send_blocker() {
            debug!(?blocker, "send skipped");
            return None;
        }
        let mode = self.mode.tag()?;

        let text = self.input.trim().to_string();
        self.messages.push(Message::user(text, mode));
        self.input.clear();
        self.in_flight = Some(mode);

        Some(PendingSend {
            mode,
            request: ChatRequest {
                mode: Some(mode.as_str().to_string()),
                messages: self.messages.iter().map(ChatMessage::from).collect(),
            },
        })
    }

    /// Appends the assistant turn for `pending` and always clears the loading flag.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        result: Result<Option<String>, TransportError>,
    ) -> SendOutcome {
        self.in_flight = None;

        let (content, outcome) = match result {
            Ok(Some(text)) if !text.trim().is_empty() => {
                (text.trim().to_string(), SendOutcome::Answered)
            }
            Ok(_) => {
                warn!(mode = %pending.mode, "chat reply carried no usable text");
                (EMPTY_REPLY_APOLOGY.to_string(), SendOutcome::Apologized)
            }
            Err(error) => {
                warn!(mode = %pending.mode, %error, "chat request failed");
                (TRANSPORT_APOLOGY.to_string(), SendOutcome::Apologized)
            }
        };
        self.messages.push(Message::assistant(content, pending.mode));
        outcome
    }

    pub async fn send(&mut self) -> SendOutcome {
        if let Some(blocker) = self.send_blocker() {
            return SendOutcome::Skipped(blocker);
        }
        let Some(pending) = self.begin_send() else {
            return SendOutcome::Skipped(SendBlocker::NotesMode);
        };
        let result = self.transport.send_chat(pending.request().clone()).await;
        self.complete_send(pending, result)
    }
}

#[cfg(test)]
#[path = "tests/conversation_tests.rs"]
mod tests;
