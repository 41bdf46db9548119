//! Message entries and the conversation session identifier.

use chrono::{DateTime, Utc};

/// Prefix of every generated conversation id.
pub const SESSION_PREFIX: &str = "conv_";

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Typed by the person using the widget.
    User,
    /// Produced by the backend, or by the widget itself for errors and greetings.
    Assistant,
}

impl Origin {
    /// Map the `is_user` flag used by the rendering primitive.
    #[must_use]
    pub fn from_is_user(is_user: bool) -> Self {
        if is_user { Self::User } else { Self::Assistant }
    }

    #[must_use]
    pub fn is_user(self) -> bool {
        matches!(self, Self::User)
    }
}

/// One rendered turn of the conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    text: String,
    origin: Origin,
}

impl MessageEntry {
    #[must_use]
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Origin::User)
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Assistant)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }
}

/// Client-chosen identifier correlating every backend call of one widget.
///
/// Derived from the creation time, so two widgets created within the same
/// millisecond share an id. Reset does not rotate it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationSession {
    id: String,
}

impl ConversationSession {
    /// Generate an id from the current time.
    #[must_use]
    pub fn generate() -> Self {
        Self::at(Utc::now())
    }

    /// Generate the id a widget created at `created_at` would use.
    #[must_use]
    pub fn at(created_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("{SESSION_PREFIX}{}", created_at.timestamp_millis()),
        }
    }

    /// Wrap an existing id, e.g. one restored by a host.
    #[must_use]
    pub fn from_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}
