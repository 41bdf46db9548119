#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use chat_widget::AppState;
use chat_widget::config::AppConfig;
use chat_widget::llm::{LlmDriver, Message};

/// Replies with the last user message, prefixed, and records every prompt.
#[derive(Debug, Default)]
pub struct EchoLlm {
    pub prompts: Mutex<Vec<Vec<Message>>>,
}

#[async_trait::async_trait]
impl LlmDriver for EchoLlm {
    async fn complete(&self, messages: &[Message]) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(format!("echo: {last}"))
    }
}

/// Always fails like an overloaded provider.
#[derive(Debug, Default)]
pub struct FailingLlm;

#[async_trait::async_trait]
impl LlmDriver for FailingLlm {
    async fn complete(&self, _messages: &[Message]) -> anyhow::Result<String> {
        Err(anyhow!("model overloaded"))
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::load_from_args(["chat-widget"]).expect("default config");
    config.llm.system_prompt = Some("Be absurd.".to_string());
    config
}

pub fn state_with(config: AppConfig, llm: Option<Arc<dyn LlmDriver>>) -> AppState {
    AppState::new(Arc::new(config), llm)
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
