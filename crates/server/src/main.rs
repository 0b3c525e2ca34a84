use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use completion::OpenAiCompletionService;
use orchestrator::PromptOrchestrator;
use shared::protocol::{ChatReply, CHAT_ROUTE};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
struct AppState {
    orchestrator: PromptOrchestrator,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    if settings.openai_api_key.is_none() {
        warn!("no OpenAI API key configured; chat requests will fail until one is set");
    }

    let service = OpenAiCompletionService::new(settings.openai_config());
    let orchestrator = PromptOrchestrator::with_fallback(
        Arc::new(service),
        settings.primary_model.clone(),
        settings.fallback_model.clone(),
    );
    let app = build_router(Arc::new(AppState { orchestrator }));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(
        %addr,
        primary = %settings.primary_model,
        fallback = %settings.fallback_model,
        "server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(CHAT_ROUTE, any(chat_endpoint))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Accepts every verb so the orchestrator can answer non-POST requests with its
/// own 405 body.
async fn chat_endpoint(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> (StatusCode, Json<ChatReply>) {
    let reply = state.orchestrator.handle(method.as_str(), &body).await;
    let status =
        StatusCode::from_u16(reply.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
