use super::*;
use crate::preferences::{NOTES_KEY, NOTES_SAVED_KEY, THEME_KEY};
use async_trait::async_trait;
use chrono::TimeZone;
use shared::domain::Role;
use std::collections::VecDeque;
use storage::MemoryStore;
use tokio::sync::Mutex;

type Reply = Result<Option<String>, TransportError>;

#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    fn with_replies(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send_chat(&self, request: ChatRequest) -> Result<Option<String>, TransportError> {
        self.requests.lock().await.push(request);
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Some("default reply".to_string())))
    }
}

fn text(reply: &str) -> Reply {
    Ok(Some(reply.to_string()))
}

fn decode_failure() -> Reply {
    let err = serde_json::from_str::<serde_json::Value>("<html>").expect_err("invalid json");
    Err(TransportError::Decode(err))
}

async fn state_with(
    replies: Vec<Reply>,
) -> (ConversationState, Arc<ScriptedTransport>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let transport = ScriptedTransport::with_replies(replies);
    let state = ConversationState::initialize(store.clone(), transport.clone())
        .await
        .expect("initialize");
    (state, transport, store)
}

#[tokio::test]
async fn whitespace_input_is_a_no_op() {
    let (mut state, transport, _store) = state_with(Vec::new()).await;
    state.set_input("   \n\t ");

    assert_eq!(
        state.send().await,
        SendOutcome::Skipped(SendBlocker::EmptyInput)
    );
    assert!(state.messages().is_empty());
    assert!(!state.is_loading());
    assert_eq!(transport.request_count().await, 0);
}

#[tokio::test]
async fn send_while_loading_is_dropped() {
    let (mut state, transport, _store) = state_with(Vec::new()).await;
    state.set_input("first question");
    let pending = state.begin_send().expect("pending");
    assert!(state.is_loading());

    state.set_input("second question");
    assert_eq!(state.send().await, SendOutcome::Skipped(SendBlocker::InFlight));
    assert!(state.begin_send().is_none());
    assert_eq!(state.messages().len(), 1);
    assert_eq!(state.input(), "second question");
    assert_eq!(transport.request_count().await, 0);

    state.complete_send(pending, text("answer"));
    assert!(!state.is_loading());
}

#[tokio::test]
async fn notes_mode_suppresses_sending() {
    let (mut state, transport, _store) = state_with(Vec::new()).await;
    state.set_mode(Mode::Notes).await.expect("mode");
    state.set_input("not a chat message");

    assert_eq!(
        state.send().await,
        SendOutcome::Skipped(SendBlocker::NotesMode)
    );
    assert!(state.messages().is_empty());
    assert_eq!(transport.request_count().await, 0);
}

#[tokio::test]
async fn successful_send_appends_user_and_trimmed_assistant_turns() {
    let (mut state, transport, _store) =
        state_with(vec![text("  Explanation: ... Practice Questions: ...\n")]).await;
    state.set_mode(Mode::Study).await.expect("mode");
    state.set_input("  Explain inflation  ");

    assert_eq!(state.send().await, SendOutcome::Answered);
    assert!(!state.is_loading());
    assert_eq!(state.input(), "");
    assert_eq!(
        state.messages(),
        &[
            Message::user("Explain inflation", ModeTag::Study),
            Message::assistant("Explanation: ... Practice Questions: ...", ModeTag::Study),
        ]
    );

    let requests = transport.requests.lock().await;
    assert_eq!(requests[0].mode.as_deref(), Some("study"));
    assert_eq!(
        requests[0].messages,
        vec![ChatMessage::new("user", "Explain inflation")]
    );
}

#[tokio::test]
async fn every_resolution_grows_log_by_two_and_clears_loading() {
    let replies = vec![
        text("fine"),
        text("   "),
        Ok(None),
        decode_failure(),
    ];
    let expected = [
        (SendOutcome::Answered, "fine"),
        (SendOutcome::Apologized, EMPTY_REPLY_APOLOGY),
        (SendOutcome::Apologized, EMPTY_REPLY_APOLOGY),
        (SendOutcome::Apologized, TRANSPORT_APOLOGY),
    ];
    let (mut state, _transport, _store) = state_with(replies).await;

    for (i, (outcome, content)) in expected.into_iter().enumerate() {
        let before = state.messages().len();
        state.set_input(format!("question {i}"));
        assert_eq!(state.send().await, outcome);
        assert!(!state.is_loading());
        assert_eq!(state.messages().len(), before + 2);

        let assistant = state.messages().last().expect("assistant turn");
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.content, content);
    }
}

#[tokio::test]
async fn switching_modes_keeps_and_forwards_full_history() {
    let (mut state, transport, _store) =
        state_with(vec![text("chat answer"), text("study answer")]).await;

    state.set_input("hello");
    state.send().await;
    state.set_mode(Mode::Study).await.expect("mode");
    assert_eq!(state.messages().len(), 2, "mode switch keeps history");

    state.set_input("explain inflation");
    state.send().await;

    let requests = transport.requests.lock().await;
    assert_eq!(requests[1].mode.as_deref(), Some("study"));
    assert_eq!(
        requests[1].messages,
        vec![
            ChatMessage::new("user", "hello"),
            ChatMessage::new("assistant", "chat answer"),
            ChatMessage::new("user", "explain inflation"),
        ]
    );

    let tags: Vec<ModeTag> = state.messages().iter().map(|m| m.mode).collect();
    assert_eq!(
        tags,
        vec![ModeTag::Chat, ModeTag::Chat, ModeTag::Study, ModeTag::Study]
    );
}

#[tokio::test]
async fn reply_is_tagged_with_mode_active_at_send_time() {
    let (mut state, _transport, _store) = state_with(Vec::new()).await;
    state.set_mode(Mode::Motivation).await.expect("mode");
    state.set_input("I feel stuck");
    let pending = state.begin_send().expect("pending");
    assert_eq!(pending.mode(), ModeTag::Motivation);

    state.set_mode(Mode::Learn).await.expect("mode");
    state.complete_send(pending, text("One small step today."));

    let last = state.messages().last().expect("assistant");
    assert_eq!(last.mode, ModeTag::Motivation);
}

#[tokio::test]
async fn thinking_indicator_follows_loading() {
    let (mut state, _transport, _store) = state_with(Vec::new()).await;
    assert_eq!(state.thinking_indicator(), None);

    state.set_input("hi");
    let pending = state.begin_send().expect("pending");
    assert_eq!(state.thinking_indicator(), Some((Mode::Chat, THINKING_TEXT)));

    state.complete_send(pending, decode_failure());
    assert_eq!(state.thinking_indicator(), None);
}

#[tokio::test]
async fn theme_survives_reinitialization() {
    let (mut state, _transport, store) = state_with(Vec::new()).await;
    state.set_theme(ThemeId::Pink).await.expect("theme");
    assert_eq!(state.palette().accent, "#e91e63");

    let reloaded = ConversationState::initialize(
        store.clone(),
        ScriptedTransport::with_replies(Vec::new()),
    )
    .await
    .expect("reinitialize");
    assert_eq!(reloaded.theme(), ThemeId::Pink);
}

#[tokio::test]
async fn reselecting_theme_still_rewrites_storage() {
    let (mut state, _transport, store) = state_with(Vec::new()).await;
    state.set_theme(ThemeId::Green).await.expect("theme");
    store.remove(THEME_KEY).await.expect("remove");

    state.set_theme(ThemeId::Green).await.expect("theme again");
    assert_eq!(
        store.get(THEME_KEY).await.expect("get").as_deref(),
        Some("green")
    );
    assert_eq!(state.theme(), ThemeId::Green);
}

#[tokio::test]
async fn unknown_stored_theme_falls_back_and_is_normalized() {
    let store = Arc::new(MemoryStore::new());
    store.set(THEME_KEY, "neon").await.expect("seed");

    let state = ConversationState::initialize(
        store.clone(),
        ScriptedTransport::with_replies(Vec::new()),
    )
    .await
    .expect("initialize");
    assert_eq!(state.theme(), ThemeId::Blue);
    assert_eq!(
        store.get(THEME_KEY).await.expect("get").as_deref(),
        Some("blue")
    );
}

#[tokio::test]
async fn notes_persist_only_while_notes_mode_is_active() {
    let (mut state, _transport, store) = state_with(Vec::new()).await;

    state.set_notes_text("draft").await.expect("notes");
    assert_eq!(state.notes_text(), "draft");
    assert_eq!(store.get(NOTES_KEY).await.expect("get"), None);
    assert_eq!(state.notes_saved_label(), "Not yet saved");

    state.set_mode(Mode::Notes).await.expect("mode");
    assert_eq!(
        store.get(NOTES_KEY).await.expect("get").as_deref(),
        Some("draft"),
        "entering notes saves the current text"
    );
    let first_saved = state.notes_saved_at().expect("saved timestamp");

    state.set_notes_text("draft, revised").await.expect("notes");
    assert_eq!(
        store.get(NOTES_KEY).await.expect("get").as_deref(),
        Some("draft, revised")
    );
    let second_saved = state.notes_saved_at().expect("saved timestamp");
    assert!(second_saved >= first_saved);
    assert!(state.notes_saved_label().starts_with("Last saved: "));

    let stored_stamp = store
        .get(NOTES_SAVED_KEY)
        .await
        .expect("get")
        .expect("stamp");
    assert!(stored_stamp.ends_with('Z'));
    assert_eq!(
        DateTime::parse_from_rfc3339(&stored_stamp)
            .expect("iso timestamp")
            .with_timezone(&Utc)
            .timestamp_millis(),
        second_saved.timestamp_millis()
    );
}

#[tokio::test]
async fn notes_are_restored_on_startup() {
    let store = Arc::new(MemoryStore::new());
    store.set(NOTES_KEY, "remember the exam").await.expect("seed");
    store
        .set(NOTES_SAVED_KEY, "2025-03-01T08:15:00.000Z")
        .await
        .expect("seed");

    let state = ConversationState::initialize(store, ScriptedTransport::with_replies(Vec::new()))
        .await
        .expect("initialize");
    assert_eq!(state.notes_text(), "remember the exam");
    assert_eq!(
        state.notes_saved_at(),
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 15, 0).single()
    );
}

#[tokio::test]
async fn birthday_flag_is_derived_from_startup_date() {
    let on_birthday = Utc.with_ymd_and_hms(2026, 11, 26, 9, 0, 0).single().expect("time");
    let state = ConversationState::initialize_at(
        Arc::new(MemoryStore::new()),
        ScriptedTransport::with_replies(Vec::new()),
        on_birthday,
    )
    .await
    .expect("initialize");
    assert!(state.show_birthday());

    let ordinary = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).single().expect("time");
    let state = ConversationState::initialize_at(
        Arc::new(MemoryStore::new()),
        ScriptedTransport::with_replies(Vec::new()),
        ordinary,
    )
    .await
    .expect("initialize");
    assert!(!state.show_birthday());
}
