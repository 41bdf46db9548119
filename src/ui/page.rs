//! The chat page.
//!
//! The page is rendered in one piece: the greeting is pre-rendered from the
//! widget's HTML projection, and a small inline script drives the DOM with the
//! same lifecycle as [`crate::widget::ChatWidget`].

use crate::widget::render::{escape_html, render_entries};
use crate::widget::{Locale, MessageEntry, Strings};

const STYLE: &str = r"
body { margin: 0; font-family: system-ui, sans-serif; background: #1e1b2e; color: #f4f1ff; }
.chat-container { max-width: 720px; height: 100vh; margin: 0 auto; display: flex; flex-direction: column; }
.chat-header { display: flex; justify-content: space-between; align-items: center; padding: 1rem; }
.chat-header h1 { font-size: 1.25rem; margin: 0; }
.chat-messages { flex: 1; overflow-y: auto; padding: 1rem; display: flex; flex-direction: column; gap: .5rem; }
.message { display: flex; }
.user-message { justify-content: flex-end; }
.message-content { max-width: 75%; padding: .6rem .9rem; border-radius: 1rem; white-space: pre-wrap; }
.user-message .message-content { background: #7c5cff; }
.bot-message .message-content { background: #2d2945; }
.typing-indicator { display: flex; gap: .25rem; padding: .8rem; }
.typing-indicator span { width: .5rem; height: .5rem; border-radius: 50%; background: #a99ee0; animation: blink 1.2s infinite; }
.typing-indicator span:nth-child(2) { animation-delay: .2s; }
.typing-indicator span:nth-child(3) { animation-delay: .4s; }
@keyframes blink { 0%, 80%, 100% { opacity: .3; } 40% { opacity: 1; } }
.chat-form { display: flex; gap: .5rem; padding: 1rem; }
.chat-form input { flex: 1; padding: .7rem; border-radius: .75rem; border: none; }
button { padding: .6rem 1rem; border-radius: .75rem; border: none; background: #7c5cff; color: white; cursor: pointer; }
button:disabled { opacity: .5; cursor: not-allowed; }
";

// Everything stays inside the IIFE; nothing is put on `window`.
const SCRIPT: &str = r"
(() => {
  const strings = JSON.parse(document.getElementById('widget-strings').textContent);
  const list = document.getElementById('chat-messages');
  const form = document.getElementById('chat-form');
  const input = document.getElementById('message-input');
  const send = document.getElementById('send-btn');
  const reset = document.getElementById('reset-btn');
  const conversationId = strings.sessionPrefix + Date.now();

  const append = (text, isUser) => {
    const node = document.createElement('div');
    node.className = 'message ' + (isUser ? 'user-message' : 'bot-message');
    const content = document.createElement('div');
    content.className = 'message-content';
    content.textContent = text;
    node.appendChild(content);
    list.appendChild(node);
    list.scrollTop = list.scrollHeight;
  };

  const showTyping = () => {
    if (document.getElementById('typing-indicator')) return;
    const node = document.createElement('div');
    node.className = 'message bot-message';
    node.id = 'typing-indicator';
    node.innerHTML = '<div class=\'typing-indicator\'><span></span><span></span><span></span></div>';
    list.appendChild(node);
    list.scrollTop = list.scrollHeight;
  };

  const removeTyping = () => document.getElementById('typing-indicator')?.remove();

  const post = (path, body) => fetch(path, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });

  form.addEventListener('submit', async (event) => {
    event.preventDefault();
    const message = input.value.trim();
    if (!message) return;

    append(message, true);
    input.value = '';
    send.disabled = true;
    showTyping();

    let reply;
    try {
      const data = await (await post('/api/chat', { message, conversation_id: conversationId })).json();
      reply = data.success ? data.message : strings.errorPrefix + data.error;
    } catch (_) {
      reply = strings.connectionError;
    }
    removeTyping();
    append(reply, false);

    send.disabled = false;
    input.focus();
  });

  reset.addEventListener('click', async () => {
    try {
      await post('/api/reset', { conversation_id: conversationId });
      list.innerHTML = '';
      append(strings.greeting, false);
    } catch (_) {
      append(strings.resetError, false);
    }
  });

  input.focus();
})();
";

/// Generate the HTML shell for the application.
fn html_shell(title: &str, lang: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
{content}
</body>
</html>"#,
        title = escape_html(title),
    )
}

/// JSON handed to the page script. `</` is escaped so the payload cannot
/// close its `<script>` element.
fn strings_json(strings: &Strings) -> String {
    serde_json::json!({
        "greeting": strings.greeting,
        "errorPrefix": strings.error_prefix,
        "connectionError": strings.connection_error,
        "resetError": strings.reset_error,
        "sessionPrefix": crate::widget::SESSION_PREFIX,
    })
    .to_string()
    .replace("</", "<\\/")
}

/// The chat page in the given locale, greeting included.
#[must_use]
pub fn index_page(title: &str, locale: Locale) -> String {
    let strings = &Strings::for_locale(locale);
    let greeting = render_entries(&[MessageEntry::assistant(strings.greeting)], false);
    let content = format!(
        r#"<div class="chat-container">
    <header class="chat-header">
        <h1>{title}</h1>
        <button id="reset-btn" type="button">{reset_label}</button>
    </header>
    <div id="chat-messages" class="chat-messages" aria-live="polite">{greeting}</div>
    <form id="chat-form" class="chat-form">
        <input id="message-input" type="text" placeholder="{placeholder}" autocomplete="off">
        <button id="send-btn" type="submit">{send_label}</button>
    </form>
</div>
<script id="widget-strings" type="application/json">{strings_json}</script>
<script>{SCRIPT}</script>"#,
        title = escape_html(title),
        reset_label = escape_html(strings.reset_label),
        placeholder = escape_html(strings.placeholder),
        send_label = escape_html(strings.send_label),
        strings_json = strings_json(strings),
    );
    html_shell(title, locale.lang_tag(), &content)
}
