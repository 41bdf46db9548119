//! HTTP implementation of [`ChatBackend`].

use url::Url;

use super::{BackendError, ChatBackend};
use crate::api::{ChatRequest, ChatResponse, ResetRequest};

/// Talks to a chat server over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use chat_widget::backend::HttpBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpBackend::new("http://localhost:5000")?;
/// assert_eq!(backend.base_url().as_str(), "http://localhost:5000/");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend for the server at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, BackendError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a backend with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        http: reqwest::Client,
    ) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // Endpoints are joined relative to the base, so keep any path prefix.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, http })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let url = self.url("api/chat")?;
        tracing::debug!(%url, conversation_id = %request.conversation_id, "Sending chat request");

        let response = self.http.post(url).json(request).send().await?;
        let status = response.status();

        // Error statuses still carry `{success: false, error}`; only the body decides.
        let body = response.bytes().await?;
        let parsed: ChatResponse = serde_json::from_slice(&body)?;

        tracing::debug!(
            status = status.as_u16(),
            success = parsed.success,
            "Chat response received"
        );
        Ok(parsed)
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), BackendError> {
        let url = self.url("api/reset")?;
        tracing::debug!(%url, conversation_id = %request.conversation_id, "Sending reset request");

        let response = self.http.post(url).json(request).send().await?;
        tracing::debug!(status = response.status().as_u16(), "Reset response received");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:5000/chatbot").unwrap();
        assert_eq!(
            backend.url("api/chat").unwrap().as_str(),
            "http://localhost:5000/chatbot/api/chat"
        );
    }

    #[test]
    fn test_root_base_url() {
        let backend = HttpBackend::new("http://localhost:5000").unwrap();
        assert_eq!(
            backend.url("api/reset").unwrap().as_str(),
            "http://localhost:5000/api/reset"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(BackendError::InvalidUrl(_))
        ));
    }
}
