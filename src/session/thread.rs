//! Conversation history and its in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::llm::Message;

/// History of one conversation, keyed by the widget's session id.
///
/// Cheap to clone; clones share the same history.
#[derive(Debug, Clone)]
pub struct Conversation {
    inner: Arc<ConversationInner>,
}

#[derive(Debug)]
struct ConversationInner {
    id: String,
    system_prompt: String,
    /// User and assistant turns, oldest first. The system prompt is not stored here.
    messages: RwLock<Vec<Message>>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl Conversation {
    fn new(id: String, system_prompt: String) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(ConversationInner {
                id,
                system_prompt,
                messages: RwLock::new(Vec::new()),
                last_activity: RwLock::new(now),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// The prompt for a new user turn: system prompt, history, then `user`.
    ///
    /// The turn itself is not stored; see [`Conversation::record_exchange`].
    #[must_use]
    pub fn prompt_for(&self, user: &str) -> Vec<Message> {
        let mut prompt = self.messages_with_system();
        prompt.push(Message::user(user));
        prompt
    }

    /// Store a completed user/assistant pair, then keep only the newest
    /// `max_history` turns.
    pub fn record_exchange(
        &self,
        user: impl Into<String>,
        assistant: impl Into<String>,
        max_history: usize,
    ) {
        let mut guard = self.write_messages();
        guard.push(Message::user(user));
        guard.push(Message::assistant(assistant));
        let excess = guard.len().saturating_sub(max_history);
        if excess > 0 {
            guard.drain(..excess);
        }
        drop(guard);
        self.touch();
    }

    /// Forget every turn; the system prompt stays.
    pub fn clear(&self) {
        self.write_messages().clear();
        self.touch();
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.inner
            .messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The full prompt sent to the model: system prompt, then history.
    #[must_use]
    pub fn messages_with_system(&self) -> Vec<Message> {
        let mut result = vec![Message::system(self.inner.system_prompt.clone())];
        result.extend(self.messages());
        result
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.inner
            .messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the conversation has been idle longer than `timeout`.
    #[must_use]
    pub fn is_idle_for(&self, timeout: Duration) -> bool {
        let last = *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }

    fn write_messages(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Message>> {
        self.inner
            .messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn touch(&self) {
        *self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }
}

/// Thread-safe store of conversations.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    inner: Arc<ConversationStoreInner>,
}

#[derive(Debug)]
struct ConversationStoreInner {
    system_prompt: String,
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl ConversationStore {
    /// Create a store whose conversations all start from `system_prompt`.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ConversationStoreInner {
                system_prompt: system_prompt.into(),
                conversations: RwLock::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.inner
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Get a conversation by id, creating it if it doesn't exist.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Conversation {
        if let Some(conversation) = self.get(id) {
            return conversation;
        }

        let mut guard = self
            .inner
            .conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!(conversation_id = %id, "Created conversation");
                Conversation::new(id.to_string(), self.inner.system_prompt.clone())
            })
            .clone()
    }

    /// Reset a conversation to just its system prompt, creating it if needed.
    pub fn reset(&self, id: &str) -> Conversation {
        let conversation = self.get_or_create(id);
        conversation.clear();
        conversation
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove conversations idle longer than `timeout`.
    ///
    /// Returns the number of conversations removed.
    pub fn cleanup_idle(&self, timeout: Duration) -> usize {
        let mut guard = self
            .inner
            .conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, conversation| !conversation.is_idle_for(timeout));
        before - guard.len()
    }
}
