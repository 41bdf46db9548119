use clap::{Parser, Subcommand};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::widget::Locale;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "HOST", global = true)]
    pub host: Option<String>,

    /// Language of the widget's own messages (fr, en)
    #[arg(long, global = true)]
    pub locale: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the chat backend and serve the browser widget (default)
    Serve,
    /// Chat with a running backend from the terminal
    Chat {
        /// Base URL of the backend
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        url: String,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub llm: LlmConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Largest accepted request body, in bytes.
    pub max_content_length: usize,
    /// Longest accepted user message, in characters.
    pub max_message_length: usize,
    /// Turns kept per conversation, system prompt excluded.
    pub max_conversation_history: usize,
    /// Conversations idle longer than this are dropped; 0 keeps them forever.
    pub conversation_idle_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    pub azure_deployment: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub locale: Locale,
    pub title: String,
}

impl AppConfig {
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Priority: CLI flag > CLI env var > `CHATW_*` env > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("limits.max_content_length", 1024 * 1024)?
            .set_default("limits.max_message_length", 1000)?
            .set_default("limits.max_conversation_history", 20)?
            .set_default("limits.conversation_idle_secs", 24 * 60 * 60)?
            .set_default("llm.base_url", "https://api.groq.com/openai")?
            .set_default("llm.model", "llama-3.3-70b-versatile")?
            .set_default("llm.temperature", 1.2)?
            .set_default("llm.max_tokens", 300)?
            .set_default("widget.locale", "fr")?
            .set_default("widget.title", "Chatbot Absurde")?;

        match &cli.config {
            Some(path) => builder = builder.add_source(File::with_name(path)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml));
            }
            None => {}
        }

        // E.g. CHATW_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("CHATW")
                .separator("__")
                .try_parsing(true),
        );

        // Conventional LLM variables, also read from `.env`.
        if let Some(val) = non_empty_var("LLM_BASE_URL") {
            builder = builder.set_override("llm.base_url", val)?;
        }
        if let Some(val) = non_empty_var("LLM_MODEL") {
            builder = builder.set_override("llm.model", val)?;
        }
        if let Some(val) = non_empty_var("LLM_API_KEY").or_else(|| non_empty_var("GROQ_API_KEY")) {
            builder = builder.set_override("llm.api_key", val)?;
        }
        if let Some(val) = non_empty_var("AZURE_DEPLOYMENT_NAME") {
            builder = builder.set_override("llm.azure_deployment", val)?;
        }

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(locale) = &cli.locale {
            builder = builder.set_override("widget.locale", locale.to_lowercase())?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// System prompt given to the model for every conversation.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        self.llm
            .system_prompt
            .as_deref()
            .unwrap_or(crate::llm::DEFAULT_SYSTEM_PROMPT)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}
