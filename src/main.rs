//! Chat widget server and terminal client.
//!
//! `chat-widget` (or `chat-widget serve`) runs the backend; `chat-widget chat`
//! talks to a running backend from the terminal.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use chat_widget::config::{AppConfig, Cli, Command};
use chat_widget::widget::Strings;
use chat_widget::{server, terminal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before clap reads its env-backed flags
    let _ = dotenv();

    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Command::Serve);

    // The terminal client shares stdout with the conversation; keep it quiet.
    let default_level = match command {
        Command::Serve => "info",
        Command::Chat { .. } => "warn",
    };

    // Initialize tracing (M-LOG-STRUCTURED)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = Arc::new(AppConfig::from_cli(&cli)?);

    match command {
        Command::Serve => server::start_server(config).await,
        Command::Chat { url } => {
            terminal::run(&url, Strings::for_locale(config.widget.locale)).await
        }
    }
}
