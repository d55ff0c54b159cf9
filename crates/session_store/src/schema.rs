use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Maximum number of characters taken from the first user message for a title.
pub const TITLE_MAX_CHARS: usize = 30;
/// Display title of a conversation whose title has not been derived yet.
pub const UNTITLED_TITLE: &str = "Untitled Chat";

/// Returns a fresh random identifier.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(nanos).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Pdf,
    Code,
    Text,
}

impl AttachmentKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Code => "code",
            Self::Text => "text",
        }
    }
}

/// A file attached to a message. `payload` is UTF-8 text for text-like files and a
/// base64 `data:` URI otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub kind: AttachmentKind,
    pub mime_type: String,
    pub payload: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    pub created_at: i64,
    /// Set when the text is an error report in place of a cut-off reply.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            id: new_id(),
            role: Role::User,
            text: text.into(),
            attachments,
            created_at: now_millis(),
            failed: false,
        }
    }

    /// An empty assistant message, ready to receive streamed text.
    #[must_use]
    pub fn assistant() -> Self {
        Self {
            id: new_id(),
            role: Role::Assistant,
            text: String::new(),
            attachments: Vec::new(),
            created_at: now_millis(),
            failed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    /// Empty until derived from the first user message; frozen afterwards.
    #[serde(default)]
    pub title: String,
    pub messages: Vec<Message>,
    pub updated_at: i64,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(new_id())
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            messages: Vec::new(),
            updated_at: 0,
        }
    }

    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED_TITLE
        } else {
            &self.title
        }
    }

    #[must_use]
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|message| message.role == Role::User)
    }

    /// Title candidate from the first user message: its leading text, or the first
    /// attachment name for attachment-only messages.
    #[must_use]
    pub fn derive_title(&self) -> Option<String> {
        let first_user = self
            .messages
            .iter()
            .find(|message| message.role == Role::User)?;

        let source = match first_user.text.trim() {
            "" => first_user
                .attachments
                .first()
                .map(|attachment| attachment.name.trim())
                .unwrap_or_default(),
            text => text,
        };

        let title: String = source.chars().take(TITLE_MAX_CHARS).collect();
        let title = title.trim_end();
        if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        }
    }

    /// Case-insensitive substring match against the title or any message text.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .messages
                .iter()
                .any(|message| message.text.to_lowercase().contains(needle))
    }

    #[must_use]
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.display_title().to_string(),
            updated_at: self.updated_at,
            message_count: self.messages.len(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Index entry shown in conversation lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub updated_at: i64,
    pub message_count: usize,
}
