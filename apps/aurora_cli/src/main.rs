use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    calendar::BIRTHDAY_BANNER, ChatTransport, ConversationState, HttpChatTransport, Mode,
    SendBlocker, SendOutcome, ThemeId,
};
use shared::domain::{Message, Role};
use storage::{normalize_database_url, SqliteStore};
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the Aurora mentor chat")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8787")]
    server_url: String,
    /// SQLite database holding theme and notes.
    #[arg(long, default_value = "./data/aurora.db")]
    store: String,
}

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let database_url = normalize_database_url(&args.store);
    let store = SqliteStore::new(&database_url)
        .await
        .with_context(|| format!("failed to open preferences store '{database_url}'"))?;
    let transport = HttpChatTransport::new(&args.server_url)
        .with_context(|| format!("invalid server url '{}'", args.server_url))?;
    info!(endpoint = %transport.endpoint(), %database_url, "starting aurora client");

    let mut state = ConversationState::initialize(Arc::new(store), Arc::new(transport)).await?;
    print_header(&state);

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = match classify(&line) {
            Line::Command(command) => {
                if !run_command(&mut state, command).await? {
                    break;
                }
                continue;
            }
            Line::Text(text) => text,
        };

        if state.mode() == Mode::Notes {
            let mut notes = state.notes_text().to_string();
            if !notes.is_empty() {
                notes.push('\n');
            }
            notes.push_str(line);
            state.set_notes_text(notes).await?;
            println!("{}", state.notes_saved_label());
            continue;
        }

        state.set_input(line);
        if !send(&mut state, &mut lines).await? {
            break;
        }
    }
    Ok(())
}

/// Runs one exchange. While the reply is outstanding, commands still run and chat
/// lines are refused by the conversation's in-flight guard. Returns `false` once
/// stdin is closed or `/quit` was entered; the pending reply is awaited either way.
async fn send(state: &mut ConversationState, lines: &mut Input) -> Result<bool> {
    let Some(pending) = state.begin_send() else {
        return Ok(true);
    };
    if let Some((mode, text)) = state.thinking_indicator() {
        println!("[{}] {text}", tag(mode));
    }

    let transport = state.transport();
    let request = pending.request().clone();
    let reply = async move { transport.send_chat(request).await };
    tokio::pin!(reply);

    let mut open = true;
    let outcome = loop {
        tokio::select! {
            result = &mut reply => break state.complete_send(pending, result),
            line = lines.next_line(), if open => match line? {
                Some(extra) => {
                    if let Line::Command(command) = classify(&extra) {
                        open = run_command(state, command).await?;
                        continue;
                    }
                    state.set_input(extra);
                    if state.send().await == SendOutcome::Skipped(SendBlocker::InFlight) {
                        println!("(still waiting for Aurora; message not sent)");
                    }
                    state.set_input("");
                }
                None => open = false,
            },
        }
    };

    if let Some(message) = state.messages().last() {
        print_message(message);
    }
    if outcome == SendOutcome::Apologized {
        info!("reply replaced by apology");
    }
    Ok(open)
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Command(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim_end();
    match line.strip_prefix('/') {
        Some(command) => Line::Command(command),
        None => Line::Text(line),
    }
}

async fn run_command(state: &mut ConversationState, command: &str) -> Result<bool> {
    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map(|(name, arg)| (name, arg.trim()))
        .unwrap_or((command, ""));

    match name {
        "quit" | "exit" => return Ok(false),
        "mode" => match arg.parse::<Mode>() {
            Ok(mode) => {
                state.set_mode(mode).await?;
                println!("{} {} mode", mode.icon(), mode.label());
                if mode == Mode::Notes {
                    print_notes(state);
                }
            }
            Err(_) => println!("unknown mode '{arg}'; try chat, study, learn, motivation or notes"),
        },
        "theme" => match arg.parse::<ThemeId>() {
            Ok(theme) => {
                state.set_theme(theme).await?;
                print_theme(state);
            }
            Err(_) => println!("unknown theme '{arg}'; try blue, pink, purple, green or yellow"),
        },
        "notes" => print_notes(state),
        "history" => state.messages().iter().for_each(print_message),
        "help" => print_help(),
        other => println!("unknown command '/{other}'; /help lists commands"),
    }
    Ok(true)
}

fn tag(mode: Mode) -> String {
    mode.as_str().to_uppercase()
}

fn print_message(message: &Message) {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "Aurora",
    };
    println!(
        "[{}] {speaker}: {}",
        tag(message.mode.into()),
        message.content
    );
}

fn print_header(state: &ConversationState) {
    if state.show_birthday() {
        println!("{BIRTHDAY_BANNER}");
    }
    let nav: Vec<String> = Mode::ALL
        .iter()
        .map(|mode| format!("{} {}", mode.icon(), mode.label()))
        .collect();
    println!("{}", nav.join("  |  "));
    print_theme(state);
    print_help();
}

fn print_theme(state: &ConversationState) {
    let palette = state.palette();
    println!(
        "theme {} (accent {}, you {}, Aurora {})",
        state.theme(),
        palette.accent,
        palette.user_bubble,
        palette.assistant_bubble
    );
}

fn print_notes(state: &ConversationState) {
    if state.notes_text().is_empty() {
        println!("(no notes yet)");
    } else {
        println!("{}", state.notes_text());
    }
    println!("{}", state.notes_saved_label());
}

fn print_help() {
    println!("commands: /mode <name>, /theme <name>, /notes, /history, /help, /quit");
}
