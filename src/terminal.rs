//! Terminal host for the chat widget.
//!
//! Lines read from stdin are submitted to a [`ChatWidget`] backed by
//! [`HttpBackend`]; `/reset` resets the conversation and `/quit` (or EOF)
//! exits.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::backend::HttpBackend;
use crate::widget::{ChatWidget, Origin, Strings, Surface, WidgetEvent};

const USER_LABEL: &str = "you> ";
const BOT_LABEL: &str = "bot> ";
const TYPING: &str = "bot> ...";
/// Carriage return plus "erase line", used to take the typing line back.
const ERASE_LINE: &str = "\r\x1b[2K";

/// Renders widget events as lines of text.
#[derive(Debug)]
pub struct TerminalSurface<W> {
    out: W,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Show the input prompt.
    pub fn prompt(&mut self) {
        let res = write!(self.out, "{USER_LABEL}").and_then(|()| self.out.flush());
        report(res);
    }

    fn render(&mut self, event: &WidgetEvent) -> std::io::Result<()> {
        match event {
            WidgetEvent::MessageAppended(entry) => match entry.origin() {
                // The user's line is already on screen from the prompt.
                Origin::User => Ok(()),
                Origin::Assistant => writeln!(self.out, "{BOT_LABEL}{}", entry.text()),
            },
            WidgetEvent::TypingShown => {
                write!(self.out, "{TYPING}")?;
                self.out.flush()
            }
            WidgetEvent::TypingRemoved => write!(self.out, "{ERASE_LINE}"),
            WidgetEvent::Cleared => writeln!(self.out, "----"),
            WidgetEvent::Focused => {
                write!(self.out, "{USER_LABEL}")?;
                self.out.flush()
            }
            WidgetEvent::InputCleared | WidgetEvent::SendControlChanged { .. } => Ok(()),
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn apply(&mut self, event: &WidgetEvent) {
        let res = self.render(event);
        report(res);
    }
}

fn report(res: std::io::Result<()>) {
    if let Err(e) = res {
        tracing::warn!(error = %e, "Failed to write to terminal");
    }
}

/// Run an interactive session against the backend at `url`.
pub async fn run(url: &str, strings: Strings) -> anyhow::Result<()> {
    let backend = HttpBackend::new(url)?;
    let mut widget =
        ChatWidget::initialize(backend, TerminalSurface::new(std::io::stdout()), strings);
    tracing::info!(conversation_id = %widget.session(), %url, "Terminal chat started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/reset" => {
                widget.reset_conversation().await;
                widget.surface_mut().prompt();
            }
            "" => widget.surface_mut().prompt(),
            _ => {
                widget.set_input(line);
                widget.submit().await;
            }
        }
    }
    Ok(())
}
