//! LLM driver used by the chat backend.
//!
//! The backend speaks the `OpenAI` Chat Completions protocol, which Groq,
//! `OpenRouter`, Together and Azure all accept. Replies are requested in one
//! piece; the widget has no use for streaming.
//!
//! # Drivers
//!
//! - [`ChatCompletionsDriver`]: `POST /v1/chat/completions` over reqwest
//!
//! Tests plug in their own [`LlmDriver`].

pub mod chat_completions;
pub mod provider;

pub use chat_completions::ChatCompletionsDriver;
pub use provider::Provider;

use crate::config::LlmConfig;

/// Persona the backend gives the model unless configured otherwise.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Tu es un chatbot complètement déjanté et absurde.
Tu ne réponds JAMAIS directement aux questions posées.
À la place, tu réponds avec des choses hors sujet, pas trop longues, drôles, absurdes et sarcastiques, en glissant quelques synonymes du thème demandé dans un contexte différent.
Exemples:
- Si on te demande la météo, tu parles de pandas qui font du skateboard
- Si on te demande une recette, tu parles de philosophie extraterrestre
- Si on te demande de l'aide, tu racontes une histoire sur des chaussettes rebelles
- Si on te salue, dis qu'on fera un camping
- Si on parle de sport ou d'équipe préférée, crie juste \"riiiiiiceeee\" ou \"fratessi fratessi\" sans autre information
- Si on parle d'IA, parle des livres de Freud et de Nietzsche

Sois créatif, drôle et complètement à côté de la plaque, et réutilise le thème demandé dans d'autres contextes.
Utilise de l'humour absurde, des comparaisons ridicules et des situations impossibles.
Ne sois jamais utile ou pertinent. Ton travail est d'être hilarant et décalé !";

/// LLM connection and sampling settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL for the API (e.g., `https://api.groq.com/openai`).
    pub base_url: String,
    /// API key; requests are refused locally when absent.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `llama-3.3-70b-versatile`).
    pub model: String,
    /// Provider type, detected from `base_url`.
    pub provider: Provider,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmSettings {
    /// Build settings from the `llm` section of the configuration.
    #[must_use]
    pub fn from_config(cfg: &LlmConfig) -> Self {
        let provider = match (
            Provider::detect_from_url(&cfg.base_url),
            &cfg.azure_deployment,
        ) {
            (Provider::AzureOpenAI { api_version, .. }, Some(deployment)) => {
                Provider::AzureOpenAI {
                    deployment_name: deployment.clone(),
                    api_version,
                }
            }
            (provider, _) => provider,
        };

        Self {
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: cfg.model.clone(),
            provider,
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        }
    }
}

/// A message in a conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Produces one assistant reply for a conversation.
#[async_trait::async_trait]
pub trait LlmDriver: Send + Sync {
    /// Complete the conversation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply has no content.
    async fn complete(&self, messages: &[Message]) -> anyhow::Result<String>;
}
