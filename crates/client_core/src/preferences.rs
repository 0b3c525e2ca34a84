use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use storage::KeyValueStore;
use tracing::warn;

use crate::theme::ThemeId;

pub const THEME_KEY: &str = "aurora-theme";
pub const NOTES_KEY: &str = "aurora-notes";
pub const NOTES_SAVED_KEY: &str = "aurora-notes-saved";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub theme: ThemeId,
    pub notes_text: String,
    pub notes_saved_at: Option<DateTime<Utc>>,
}

impl Preferences {
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let theme = ThemeId::resolve(store.get(THEME_KEY).await?.as_deref());
        let notes_text = store.get(NOTES_KEY).await?.unwrap_or_default();
        let notes_saved_at = store
            .get(NOTES_SAVED_KEY)
            .await?
            .and_then(|raw| parse_timestamp(&raw));
        Ok(Self {
            theme,
            notes_text,
            notes_saved_at,
        })
    }
}

pub async fn save_theme(store: &dyn KeyValueStore, theme: ThemeId) -> Result<()> {
    store.set(THEME_KEY, theme.as_str()).await
}

pub async fn save_notes(
    store: &dyn KeyValueStore,
    notes_text: &str,
    saved_at: DateTime<Utc>,
) -> Result<()> {
    store.set(NOTES_KEY, notes_text).await?;
    store.set(NOTES_SAVED_KEY, &format_timestamp(saved_at)).await
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(error) => {
            warn!(%error, value = raw, "ignoring unreadable notes timestamp");
            None
        }
    }
}
