mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use chat_widget::api::{ChatResponse, ResetResponse};
use chat_widget::llm::{LlmDriver, Message, MessageRole};
use chat_widget::widget::Locale;
use chat_widget::server::router;

use common::{EchoLlm, FailingLlm, state_with, test_config};

fn server_with(llm: Option<Arc<dyn LlmDriver>>) -> (TestServer, chat_widget::AppState) {
    let state = state_with(test_config(), llm);
    let server = TestServer::new(router(state.clone())).unwrap();
    (server, state)
}

/// Fails after a delay on "slow"; echoes anything else, recording the prompt.
#[derive(Debug, Default)]
struct SlowFailingLlm {
    prompts: Mutex<Vec<Vec<Message>>>,
}

#[async_trait::async_trait]
impl LlmDriver for SlowFailingLlm {
    async fn complete(&self, messages: &[Message]) -> anyhow::Result<String> {
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        if last == "slow" {
            tokio::time::sleep(Duration::from_millis(200)).await;
            anyhow::bail!("model timed out");
        }
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(format!("echo: {last}"))
    }
}

fn echo_server() -> (TestServer, chat_widget::AppState, Arc<EchoLlm>) {
    let llm = Arc::new(EchoLlm::default());
    let (server, state) = server_with(Some(Arc::clone(&llm) as Arc<dyn LlmDriver>));
    (server, state, llm)
}

#[tokio::test]
async fn test_index_page() {
    let (server, _state, _llm) = echo_server();

    let response = server.get("/").await;
    response.assert_status_ok();

    let body = response.text();
    assert!(body.contains("Chatbot Absurde"));
    assert!(body.contains("Salut ! Je suis un chatbot"));
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
}

#[tokio::test]
async fn test_index_page_language_follows_locale() {
    let (server, _state, _llm) = echo_server();
    assert!(server.get("/").await.text().contains(r#"<html lang="fr">"#));

    let mut config = test_config();
    config.widget.locale = Locale::En;
    let server = TestServer::new(router(state_with(config, None))).unwrap();

    let body = server.get("/").await.text();
    assert!(body.contains(r#"<html lang="en">"#));
    assert!(body.contains("completely unhinged chatbot"));
}

#[tokio::test]
async fn test_chat_success_records_history() {
    let (server, state, llm) = echo_server();

    let response = server
        .post("/api/chat")
        .json(&json!({"message": "  Hello  ", "conversation_id": "conv_1"}))
        .await;
    response.assert_status_ok();
    let body: ChatResponse = response.json();
    assert_eq!(body, ChatResponse::reply("echo: Hello"));

    let conversation = state.conversations.get("conv_1").expect("conversation");
    let history = conversation.messages();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[0].content, "Hello");
    assert_eq!(history[1].role, MessageRole::Assistant);

    // The model saw the system prompt first.
    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts[0][0].role, MessageRole::System);
    assert_eq!(prompts[0][0].content, "Be absurd.");
}

#[tokio::test]
async fn test_chat_follow_up_sees_previous_turns() {
    let (server, _state, llm) = echo_server();

    for message in ["one", "two"] {
        server
            .post("/api/chat")
            .json(&json!({"message": message, "conversation_id": "conv_2"}))
            .await
            .assert_status_ok();
    }

    let prompts = llm.prompts.lock().unwrap();
    // system, user one, assistant, user two
    assert_eq!(prompts[1].len(), 4);
    assert_eq!(prompts[1][1].content, "one");
    assert_eq!(prompts[1][3].content, "two");
}

#[tokio::test]
async fn test_chat_default_conversation_id() {
    let (server, state, _llm) = echo_server();

    server
        .post("/api/chat")
        .json(&json!({"message": "hi"}))
        .await
        .assert_status_ok();

    assert_eq!(
        state.conversations.get("default").unwrap().message_count(),
        2
    );
}

#[tokio::test]
async fn test_chat_validation_errors() {
    let (server, state, llm) = echo_server();

    let cases = [
        (json!({"conversation_id": "c"}), "Message is required"),
        (json!({"message": "", "conversation_id": "c"}), "Message cannot be empty"),
        (json!({"message": "  \n ", "conversation_id": "c"}), "Message cannot be empty"),
        (
            json!({"message": "a".repeat(1001), "conversation_id": "c"}),
            "Message exceeds 1000 characters",
        ),
    ];

    for (payload, expected) in cases {
        let response = server.post("/api/chat").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ChatResponse = response.json();
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some(expected));
        assert!(body.message.is_none());
    }

    assert!(llm.prompts.lock().unwrap().is_empty());
    assert!(state.conversations.get("c").is_none());
}

#[tokio::test]
async fn test_chat_length_counts_characters() {
    let (server, _state, _llm) = echo_server();

    server
        .post("/api/chat")
        .json(&json!({"message": "a".repeat(1000)}))
        .await
        .assert_status_ok();

    // 1000 two-byte characters are still within the limit.
    server
        .post("/api/chat")
        .json(&json!({"message": "é".repeat(1000)}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_chat_malformed_json() {
    let (server, _state, _llm) = echo_server();

    let response = server
        .post("/api/chat")
        .text("{not json")
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_chat_history_is_capped() {
    let (server, state, _llm) = echo_server();

    for i in 0..15 {
        server
            .post("/api/chat")
            .json(&json!({"message": format!("m{i}"), "conversation_id": "long"}))
            .await
            .assert_status_ok();
    }

    let history = state.conversations.get("long").unwrap().messages();
    assert_eq!(history.len(), 20);
    assert_eq!(history[0].content, "m5");
    assert_eq!(history[19].content, "echo: m14");
}

#[tokio::test]
async fn test_chat_llm_failure_stores_nothing() {
    let (server, state) = server_with(Some(Arc::new(FailingLlm)));

    let response = server
        .post("/api/chat")
        .json(&json!({"message": "Hello", "conversation_id": "conv_f"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: ChatResponse = response.json();
    assert_eq!(body, ChatResponse::failure("model overloaded"));

    assert_eq!(state.conversations.get("conv_f").unwrap().message_count(), 0);
}

#[tokio::test]
async fn test_failed_call_keeps_concurrent_exchange() {
    let llm = Arc::new(SlowFailingLlm::default());
    let (server, state) = server_with(Some(Arc::clone(&llm) as Arc<dyn LlmDriver>));

    let slow = async {
        server
            .post("/api/chat")
            .json(&json!({"message": "slow", "conversation_id": "shared"}))
            .await
    };
    let fast = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        server
            .post("/api/chat")
            .json(&json!({"message": "fast", "conversation_id": "shared"}))
            .await
    };
    let (slow, fast) = tokio::join!(slow, fast);

    slow.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    fast.assert_status_ok();

    let history = state.conversations.get("shared").unwrap().messages();
    assert_eq!(history, vec![Message::user("fast"), Message::assistant("echo: fast")]);

    // The pending turn was never part of another request's prompt.
    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].iter().all(|m| m.content != "slow"));
}

#[tokio::test]
async fn test_failure_leaves_earlier_turns() {
    let llm = Arc::new(SlowFailingLlm::default());
    let (server, state) = server_with(Some(Arc::clone(&llm) as Arc<dyn LlmDriver>));

    for message in ["one", "slow", "two"] {
        server
            .post("/api/chat")
            .json(&json!({"message": message, "conversation_id": "c"}))
            .await;
    }

    let contents: Vec<_> = state
        .conversations
        .get("c")
        .unwrap()
        .messages()
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(contents, vec!["one", "echo: one", "two", "echo: two"]);
}

#[tokio::test]
async fn test_chat_without_llm_configured() {
    let (server, _state) = server_with(None);

    let response = server
        .post("/api/chat")
        .json(&json!({"message": "Hello", "conversation_id": "c"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: ChatResponse = response.json();
    assert_eq!(
        body.error.as_deref(),
        Some("LLM_API_KEY environment variable not set")
    );
}

#[tokio::test]
async fn test_reset_clears_history() {
    let (server, state, _llm) = echo_server();

    server
        .post("/api/chat")
        .json(&json!({"message": "Hello", "conversation_id": "conv_r"}))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/reset")
        .json(&json!({"conversation_id": "conv_r"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<ResetResponse>(), ResetResponse { success: true });
    assert_eq!(state.conversations.get("conv_r").unwrap().message_count(), 0);
}

#[tokio::test]
async fn test_reset_unknown_or_missing_id() {
    let (server, state, _llm) = echo_server();

    server
        .post("/api/reset")
        .json(&json!({"conversation_id": "never-seen"}))
        .await
        .assert_status_ok();

    // No body at all resets the default conversation.
    let response = server.post("/api/reset").await;
    response.assert_status_ok();
    assert_eq!(response.json::<ResetResponse>(), ResetResponse { success: true });
    assert!(state.conversations.get("default").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let (server, _state, _llm) = echo_server();

    server.get("/api/nothing").await.assert_status_not_found();
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut config = test_config();
    config.limits.max_content_length = 256;
    let state = state_with(config, Some(Arc::new(EchoLlm::default())));
    let server = TestServer::new(router(state)).unwrap();

    let response = server
        .post("/api/chat")
        .json(&json!({"message": "a".repeat(500), "conversation_id": "c"}))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: ChatResponse = response.json();
    assert!(!body.success);
}
