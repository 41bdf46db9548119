//! Chat widget controller.
//!
//! [`ChatWidget`] owns the conversation as an explicit list of
//! [`MessageEntry`] records and projects every change onto a [`Surface`].
//! Backend calls go through a [`ChatBackend`], so the widget runs the same
//! against a live server, a terminal host, or a scripted test double.
//!
//! # Submission lifecycle
//!
//! `Idle -> Sending -> Idle`. While sending, the send control is disabled and
//! the typing indicator is shown. Both operations take `&mut self`, so one
//! widget never has two calls in flight.
//!
//! # Example
//!
//! ```rust,no_run
//! use chat_widget::backend::HttpBackend;
//! use chat_widget::widget::{ChatWidget, RecordingSurface, Strings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = HttpBackend::new("http://localhost:5000")?;
//! let mut widget = ChatWidget::initialize(backend, RecordingSurface::new(), Strings::french());
//!
//! widget.submit_message("Quel temps fait-il ?").await;
//! assert_eq!(widget.entries().len(), 2);
//! # Ok(())
//! # }
//! ```

mod message;
pub mod render;
mod strings;
mod surface;

pub use message::{ConversationSession, MessageEntry, Origin, SESSION_PREFIX};
pub use strings::{Locale, Strings};
pub use surface::{NullSurface, RecordingSurface, Surface, WidgetEvent};

use crate::api::{ChatRequest, ChatResponse, ResetRequest};
use crate::backend::{BackendError, ChatBackend};

/// How a chat call ended, from the widget's point of view.
#[derive(Debug)]
pub enum ChatOutcome {
    /// The server answered with `success: true`.
    Reply(String),
    /// The server answered with `success: false`.
    Rejected(String),
    /// The call did not complete.
    Transport(BackendError),
}

impl From<Result<ChatResponse, BackendError>> for ChatOutcome {
    fn from(result: Result<ChatResponse, BackendError>) -> Self {
        match result {
            Ok(ChatResponse {
                success: true,
                message,
                ..
            }) => Self::Reply(message.unwrap_or_default()),
            Ok(ChatResponse { error, .. }) => Self::Rejected(error.unwrap_or_default()),
            Err(e) => Self::Transport(e),
        }
    }
}

/// A single chat widget instance.
#[derive(Debug)]
pub struct ChatWidget<B, S> {
    backend: B,
    surface: S,
    strings: Strings,
    session: ConversationSession,
    entries: Vec<MessageEntry>,
    input: String,
    typing: bool,
    send_enabled: bool,
    focused: bool,
}

impl<B: ChatBackend, S: Surface> ChatWidget<B, S> {
    /// Create a widget with a fresh session id and focus on the input.
    pub fn initialize(backend: B, surface: S, strings: Strings) -> Self {
        Self::with_session(backend, surface, strings, ConversationSession::generate())
    }

    /// Create a widget bound to an existing session.
    pub fn with_session(
        backend: B,
        surface: S,
        strings: Strings,
        session: ConversationSession,
    ) -> Self {
        let mut widget = Self {
            backend,
            surface,
            strings,
            session,
            entries: Vec::new(),
            input: String::new(),
            typing: false,
            send_enabled: true,
            focused: false,
        };
        tracing::debug!(conversation_id = %widget.session, "Chat widget initialized");
        widget.focus();
        widget
    }

    /// Replace the content of the message field.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Submit whatever is currently in the message field.
    pub async fn submit(&mut self) {
        let text = self.input.clone();
        self.submit_message(&text).await;
    }

    /// Send `text` to the backend and render the exchange.
    ///
    /// Text that is empty after trimming is ignored without any visible
    /// change. Every other call ends with exactly one user entry followed by
    /// exactly one assistant entry, and the widget back in its idle state.
    pub async fn submit_message(&mut self, text: &str) {
        let message = text.trim();
        if message.is_empty() {
            return;
        }

        self.append_message(message, true);
        self.clear_input();
        self.set_send_enabled(false);
        self.show_typing_indicator();

        let request = ChatRequest {
            message: message.to_string(),
            conversation_id: self.session.id().to_string(),
        };
        let outcome = ChatOutcome::from(self.backend.chat(&request).await);

        self.remove_typing_indicator();
        let reply = match outcome {
            ChatOutcome::Reply(reply) => reply,
            ChatOutcome::Rejected(error) => {
                tracing::warn!(conversation_id = %self.session, %error, "Chat request rejected");
                self.strings.application_error(&error)
            }
            ChatOutcome::Transport(e) => {
                tracing::warn!(conversation_id = %self.session, error = %e, "Chat request failed");
                self.strings.connection_error.to_string()
            }
        };
        self.append_message(reply, false);

        self.set_send_enabled(true);
        self.focus();
    }

    /// Ask the backend to forget the conversation and start over.
    ///
    /// Any response that arrives counts as success: the list is cleared and
    /// the greeting shown. If the call fails, history is kept and an error
    /// entry is appended instead. The session id is kept either way.
    pub async fn reset_conversation(&mut self) {
        let request = ResetRequest {
            conversation_id: self.session.id().to_string(),
        };

        match self.backend.reset(&request).await {
            Ok(()) => {
                self.clear_entries();
                let greeting = self.strings.greeting;
                self.append_message(greeting, false);
            }
            Err(e) => {
                tracing::warn!(conversation_id = %self.session, error = %e, "Reset request failed");
                let error = self.strings.reset_error;
                self.append_message(error, false);
            }
        }
    }

    /// Append an entry at the end of the list and scroll to it.
    pub fn append_message(&mut self, text: impl Into<String>, is_user: bool) {
        let entry = MessageEntry::new(text, Origin::from_is_user(is_user));
        self.surface.apply(&WidgetEvent::MessageAppended(entry.clone()));
        self.entries.push(entry);
    }

    fn clear_entries(&mut self) {
        self.entries.clear();
        self.surface.apply(&WidgetEvent::Cleared);
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.surface.apply(&WidgetEvent::InputCleared);
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
        self.surface.apply(&WidgetEvent::SendControlChanged { enabled });
    }

    fn show_typing_indicator(&mut self) {
        if !self.typing {
            self.typing = true;
            self.surface.apply(&WidgetEvent::TypingShown);
        }
    }

    fn remove_typing_indicator(&mut self) {
        if self.typing {
            self.typing = false;
            self.surface.apply(&WidgetEvent::TypingRemoved);
        }
    }

    fn focus(&mut self) {
        self.focused = true;
        self.surface.apply(&WidgetEvent::Focused);
    }
}

impl<B, S> ChatWidget<B, S> {
    #[must_use]
    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    #[must_use]
    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    #[must_use]
    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[must_use]
    pub fn strings(&self) -> &Strings {
        &self.strings
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Current list as HTML, with the typing indicator if it is showing.
    #[must_use]
    pub fn render_html(&self) -> String {
        render::render_entries(&self.entries, self.typing)
    }
}
