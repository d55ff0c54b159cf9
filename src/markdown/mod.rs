//! Markdown/code segmentation for streamed assistant text.
//!
//! [`segment`] is a pure function from a text buffer to an ordered block tree. It is
//! re-run over the whole buffer after every streamed fragment, so its output for a
//! given string never depends on how that string was delivered.

mod block;
mod inline;

pub use block::segment;

/// A top-level structural unit of rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A closed fenced region. `language` is `None` when the fence carried no usable tag.
    Code {
        language: Option<String>,
        code: String,
    },
    /// Everything outside closed fences, one inline node per source line.
    Prose(Vec<Inline>),
}

impl Block {
    /// Language label shown for code blocks without a tag.
    pub const UNSPECIFIED_LANGUAGE: &'static str = "text";

    /// Returns the display language for code blocks.
    #[must_use]
    pub fn language_label(&self) -> Option<&str> {
        match self {
            Self::Code { language, .. } => {
                Some(language.as_deref().unwrap_or(Self::UNSPECIFIED_LANGUAGE))
            }
            Self::Prose(_) => None,
        }
    }
}

/// Inline structure inside a [`Block::Prose`].
///
/// Line-level variants (`Heading`, `ListItem`, `Paragraph`, `Break`) only appear at the
/// top of a prose block; `Text`, `Bold` and `InlineCode` appear as their children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    /// Bold content is literal text: inline code inside bold is not extracted.
    Bold(Vec<Inline>),
    InlineCode(String),
    Heading {
        level: u8,
        children: Vec<Inline>,
    },
    ListItem {
        kind: ListKind,
        children: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    /// A blank source line.
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    /// Ordered item with the number written in the source. Numbers too large for
    /// `u64` saturate.
    Ordered(u64),
}
