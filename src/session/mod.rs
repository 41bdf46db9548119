//! Server-side conversation storage.
//!
//! The backend keeps one history per conversation id so the model sees the
//! whole exchange. Histories live in memory only and are lost on restart.
//!
//! # Example
//!
//! ```rust
//! use chat_widget::session::ConversationStore;
//!
//! let store = ConversationStore::new("You are unhelpful.");
//! let conversation = store.get_or_create("conv_1700000000000");
//! conversation.record_exchange("Hello!", "Bonjour, camarade panda.", 20);
//!
//! assert_eq!(conversation.prompt_for("Encore ?").len(), 4);
//! ```

mod thread;

pub use thread::{Conversation, ConversationStore};
