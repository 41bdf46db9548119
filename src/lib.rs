//! Chat widget
//!
//! A chat widget controller, the HTTP client it uses, and the chat backend it
//! talks to.
//!
//! # Architecture
//!
//! - **Widget**: headless controller owning the message list, typing indicator
//!   and send control; rendering is a projection onto a [`widget::Surface`]
//! - **Backend client**: [`backend::ChatBackend`] seam with a reqwest
//!   implementation for `/api/chat` and `/api/reset`
//! - **Server**: Axum app serving the widget page and the two endpoints,
//!   answering through an OpenAI-compatible LLM
//!
//! # Modules
//!
//! - [`widget`]: widget state, events and HTML projection
//! - [`backend`]: backend trait and HTTP client
//! - [`api`]: wire types shared by client and server
//! - [`server`]: router and handlers
//! - [`session`]: server-side conversation histories
//! - [`llm`]: chat completions driver
//! - [`terminal`]: terminal host for the widget

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod llm;
pub mod server;
pub mod session;
pub mod terminal;
pub mod ui;
pub mod widget;

use crate::config::AppConfig;

use llm::LlmDriver;
use session::ConversationStore;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Conversation histories keyed by conversation id.
    pub conversations: ConversationStore,
    /// Model used to answer; `None` when no API key is configured.
    pub llm: Option<Arc<dyn LlmDriver>>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, llm: Option<Arc<dyn LlmDriver>>) -> Self {
        Self {
            conversations: ConversationStore::new(config.system_prompt()),
            llm,
            config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("conversations", &self.conversations.len())
            .field("llm", &self.llm.is_some())
            .finish()
    }
}
