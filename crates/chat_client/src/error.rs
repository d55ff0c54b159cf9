use std::path::PathBuf;

use thiserror::Error;

/// Rejections raised by [`crate::stream::StreamAccumulator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("a reply is already streaming into message {message_id}")]
    AlreadyStreaming { message_id: String },
    #[error("message {message_id} is not the streaming message")]
    NotCurrent { message_id: String },
}

/// User-facing rejections raised by [`crate::controller::ConversationController`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("a reply is still streaming")]
    StreamInFlight,
    #[error("nothing to send")]
    EmptyPrompt,
    #[error("no conversation matches '{query}'")]
    ConversationNotFound { query: String },
}

impl ChatError {
    pub fn not_found(query: impl Into<String>) -> Self {
        Self::ConversationNotFound {
            query: query.into(),
        }
    }
}

/// Per-file failure while turning a path into an attachment.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} has no file name")]
    MissingName { path: PathBuf },
}
