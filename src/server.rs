use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::{HeaderValue, header},
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use tracing::{error, info, warn};

use crate::AppState;
use crate::api::{ChatResponse, DEFAULT_CONVERSATION_ID, ResetResponse};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::llm::{ChatCompletionsDriver, LlmDriver, LlmSettings};
use crate::session::ConversationStore;
use crate::ui;

/// How often idle conversations are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// `POST /api/chat` body as received. Fields are optional so that missing
/// values get a JSON error reply instead of a bare extractor rejection.
#[derive(Debug, Deserialize)]
struct ChatPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResetPayload {
    #[serde(default)]
    conversation_id: Option<String>,
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let settings = LlmSettings::from_config(&config.llm);
    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        "LLM configuration loaded"
    );

    let llm: Option<Arc<dyn LlmDriver>> = if settings.api_key.is_some() {
        Some(Arc::new(ChatCompletionsDriver::new(settings)))
    } else {
        warn!(
            name: "llm.config.missing_key",
            "No LLM API key configured; chat requests will be refused"
        );
        None
    };

    let state = AppState::new(Arc::clone(&config), llm);

    let idle_secs = config.limits.conversation_idle_secs;
    if idle_secs > 0 {
        spawn_idle_sweeper(
            state.conversations.clone(),
            Duration::from_secs(idle_secs),
            CLEANUP_INTERVAL,
        );
    }

    let app = router(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        name: "server.started",
        address = %format!("http://{address}"),
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Drop conversations idle longer than `timeout`, checking every `every`.
fn spawn_idle_sweeper(
    conversations: ConversationStore,
    timeout: Duration,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = conversations.cleanup_idle(timeout);
            if removed > 0 {
                info!(name: "conversation.cleanup", removed, "Dropped idle conversations");
            }
        }
    })
}

/// Build the router serving the widget page and the chat API.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.limits.max_content_length;

    Router::new()
        .route("/", get(index_handler))
        .route("/api/chat", post(api_chat))
        .route("/api/reset", post(api_reset))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - The page hosting the browser widget.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(ui::page::index_page(
        &state.config.widget.title,
        state.config.widget.locale,
    ))
}

/// POST /api/chat - Answer one user message within its conversation.
async fn api_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload?;

    let message = payload
        .message
        .ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;
    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".to_string()));
    }
    let max_len = state.config.limits.max_message_length;
    if message.chars().count() > max_len {
        return Err(ApiError::BadRequest(format!(
            "Message exceeds {max_len} characters"
        )));
    }

    let conversation_id = payload
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string());

    let Some(llm) = &state.llm else {
        return Err(ApiError::NotConfigured(
            "LLM_API_KEY environment variable not set".to_string(),
        ));
    };

    info!(
        name: "chat.request.received",
        conversation_id = %conversation_id,
        length = message.len(),
        "Received chat request"
    );

    // Stored only after the model answers; a failed call leaves no trace.
    let conversation = state.conversations.get_or_create(&conversation_id);
    let prompt = conversation.prompt_for(message);

    match llm.complete(&prompt).await {
        Ok(reply) => {
            conversation.record_exchange(
                message,
                reply.as_str(),
                state.config.limits.max_conversation_history,
            );
            info!(
                name: "chat.reply.sent",
                conversation_id = %conversation_id,
                history = conversation.message_count(),
                "Chat reply sent"
            );
            Ok(Json(ChatResponse::reply(reply)))
        }
        Err(e) => {
            error!(
                name: "chat.llm.failed",
                conversation_id = %conversation_id,
                error = %format!("{e:#}"),
                "LLM call failed"
            );
            Err(ApiError::Llm(format!("{e:#}")))
        }
    }
}

/// POST /api/reset - Forget a conversation's history.
async fn api_reset(
    State(state): State<AppState>,
    payload: Result<Json<ResetPayload>, JsonRejection>,
) -> Result<Json<ResetResponse>, ApiError> {
    let conversation_id = match payload {
        Ok(Json(payload)) => payload.conversation_id,
        Err(rejection) => match ApiError::from(rejection) {
            ApiError::PayloadTooLarge => return Err(ApiError::PayloadTooLarge),
            _ => None,
        },
    }
    .filter(|id| !id.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string());

    state.conversations.reset(&conversation_id);
    info!(
        name: "conversation.reset",
        conversation_id = %conversation_id,
        "Conversation reset"
    );

    Ok(Json(ResetResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_idle_sweeper_drops_stale_conversations() {
        let store = ConversationStore::new("p");
        let _ = store.get_or_create("stale");

        let sweeper = spawn_idle_sweeper(
            store.clone(),
            Duration::from_millis(30),
            Duration::from_millis(10),
        );
        tokio::time::sleep(Duration::from_millis(150)).await;
        sweeper.abort();

        assert!(store.get("stale").is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_idle_sweeper_keeps_active_conversations() {
        let store = ConversationStore::new("p");
        let conversation = store.get_or_create("active");

        let sweeper = spawn_idle_sweeper(
            store.clone(),
            Duration::from_secs(3600),
            Duration::from_millis(10),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweeper.abort();

        conversation.record_exchange("hi", "ho", 20);
        assert_eq!(store.get("active").unwrap().message_count(), 2);
    }
}
