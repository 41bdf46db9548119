//! Wire types for the `/api/chat` and `/api/reset` endpoints.
//!
//! The same structs are serialized by [`crate::backend::HttpBackend`] and
//! produced by the handlers in [`crate::server`].

use serde::{Deserialize, Serialize};

/// Conversation id used by the server when a request does not carry one.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message, already trimmed by the widget.
    pub message: String,
    /// Client-chosen conversation identifier.
    pub conversation_id: String,
}

/// Body returned by `POST /api/chat`.
///
/// `message` is set when `success` is true, `error` when it is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    /// A successful reply carrying the assistant's text.
    #[must_use]
    pub fn reply(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// An application-level failure with a short description.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Body of `POST /api/reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    pub conversation_id: String,
}

/// Body returned by `POST /api/reset`. The widget never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
}
