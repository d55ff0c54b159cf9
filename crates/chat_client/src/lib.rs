//! Terminal chat client over a pluggable generation provider.
//!
//! ## Provider bootstrap
//!
//! `MILLION_CHAT_PROVIDER` selects the provider; it defaults to `mock`, an offline
//! provider that streams a canned markdown reply fragment by fragment.
//!
//! ## Environment
//!
//! - `MILLION_CHAT_HOME`: state directory (default `$HOME/.million_chat`).
//! - `MILLION_CHAT_PERSONA`: `hacker` (default) or `modern`.
//! - `MILLION_CHAT_ACCESS_SECRET`: when set, the chat stays locked until the secret
//!   is entered once; the unlock is remembered in the store.
//! - `MILLION_CHAT_LOG`, `MILLION_CHAT_NO_COLOR`, `COLUMNS`, `LINES`: see
//!   [`million_chat::config`].
//!
//! Conversation contract: every user message is persisted before its reply starts
//! streaming, the reply is persisted again when it completes or fails, and at most
//! one reply streams at a time.

pub mod attachments;
pub mod auth;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod persona;
pub mod providers;
pub mod repl;
pub mod stream;
pub mod view;

pub use controller::{ConversationController, PreparedTurn, TurnUpdate};
pub use error::{AttachmentError, ChatError, StreamError};
pub use persona::Persona;
pub use stream::StreamAccumulator;
