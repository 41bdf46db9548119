//! Backend collaborator of the widget.
//!
//! [`ChatBackend`] is the seam between the widget and whatever answers
//! `/api/chat` and `/api/reset`. [`HttpBackend`] is the production
//! implementation; tests substitute scripted ones.

mod http;

pub use http::HttpBackend;

use thiserror::Error;

use crate::api::{ChatRequest, ChatResponse, ResetRequest};

/// A call that could not complete.
///
/// Application-level failures (`success: false`) are not errors at this
/// layer; they arrive as an `Ok` [`ChatResponse`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, TLS or body-read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not a valid chat response.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured backend URL is unusable.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Any other failure reported by a non-HTTP backend.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Request/response access to the chat backend.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user message and return the server's verdict.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;

    /// Ask the server to forget the conversation. The response body is
    /// ignored; only a failure to complete the call is reported.
    async fn reset(&self, request: &ResetRequest) -> Result<(), BackendError>;
}

#[async_trait::async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for std::sync::Arc<T> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        (**self).chat(request).await
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), BackendError> {
        (**self).reset(request).await
    }
}
