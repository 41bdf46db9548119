//! HTML projection of the message list.
//!
//! Produces the same markup the browser widget builds at runtime, so the
//! server can pre-render entries into the page.

use super::message::{MessageEntry, Origin};

/// Markup of the typing indicator placeholder.
pub const TYPING_INDICATOR_HTML: &str = r#"<div class="message bot-message" id="typing-indicator"><div class="typing-indicator"><span></span><span></span><span></span></div></div>"#;

/// CSS class carried by an entry of the given origin.
#[must_use]
pub fn origin_class(origin: Origin) -> &'static str {
    match origin {
        Origin::User => "user-message",
        Origin::Assistant => "bot-message",
    }
}

/// Render one entry. Text is escaped.
#[must_use]
pub fn render_entry(entry: &MessageEntry) -> String {
    format!(
        r#"<div class="message {}"><div class="message-content">{}</div></div>"#,
        origin_class(entry.origin()),
        escape_html(entry.text())
    )
}

/// Render the whole list, optionally followed by the typing indicator.
#[must_use]
pub fn render_entries(entries: &[MessageEntry], typing: bool) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&render_entry(entry));
    }
    if typing {
        out.push_str(TYPING_INDICATOR_HTML);
    }
    out
}

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
