//! Durable, searchable storage for chat conversations.
//!
//! State lives in a [`KeyValueStore`]: the full conversation list under one key and
//! the active conversation pointer under another. Unreadable or corrupt state loads
//! as an empty history rather than an error.

mod error;
mod kv;
mod paths;
mod schema;
mod store;

pub use error::SessionStoreError;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use paths::{key_file_name, sanitize_key, store_root, STORE_DIR};
pub use schema::{
    new_id, now_millis, Attachment, AttachmentKind, Conversation, ConversationSummary, Message,
    Role, TITLE_MAX_CHARS, UNTITLED_TITLE,
};
pub use store::{SessionStore, ACTIVE_KEY, SESSIONS_KEY};
