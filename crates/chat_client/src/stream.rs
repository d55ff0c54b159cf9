use million_chat::{segment, Block};
use session_store::{Conversation, Message, Role};

use crate::error::StreamError;

struct CurrentStream {
    message_id: String,
    blocks: Vec<Block>,
}

/// Grows the text of one assistant message from streamed fragments.
///
/// At most one stream is live at a time. Every accepted fragment re-segments the whole
/// buffer, so the block tree after the last fragment equals `segment` of the full reply
/// no matter where the fragment boundaries fell.
#[derive(Default)]
pub struct StreamAccumulator {
    current: Option<CurrentStream>,
}

impl StreamAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty assistant message to `conversation` and makes it the stream target.
    pub fn begin(&mut self, conversation: &mut Conversation) -> Result<String, StreamError> {
        if let Some(current) = &self.current {
            return Err(StreamError::AlreadyStreaming {
                message_id: current.message_id.clone(),
            });
        }

        let message = Message::assistant();
        let message_id = message.id.clone();
        conversation.messages.push(message);
        self.current = Some(CurrentStream {
            message_id: message_id.clone(),
            blocks: Vec::new(),
        });

        tracing::debug!(conversation = %conversation.id, message = %message_id, "stream started");
        Ok(message_id)
    }

    /// Concatenates `fragment` onto the streaming message and returns the fresh block tree.
    pub fn append(
        &mut self,
        conversation: &mut Conversation,
        message_id: &str,
        fragment: &str,
    ) -> Result<&[Block], StreamError> {
        let current = self.current_for(message_id)?;
        let message = streaming_message(conversation, message_id)?;
        message.text.push_str(fragment);
        current.blocks = segment(&message.text);
        Ok(&current.blocks)
    }

    /// Freezes the streaming message as a finished reply.
    pub fn complete(
        &mut self,
        conversation: &mut Conversation,
        message_id: &str,
    ) -> Result<(), StreamError> {
        self.current_for(message_id)?;
        streaming_message(conversation, message_id)?;
        self.current = None;
        tracing::debug!(conversation = %conversation.id, message = message_id, "stream completed");
        Ok(())
    }

    /// Freezes the streaming message with `reason` as visible content.
    ///
    /// An empty reply is replaced by the reason; a partial reply keeps its text and
    /// gains the reason as a trailing paragraph.
    pub fn fail(
        &mut self,
        conversation: &mut Conversation,
        message_id: &str,
        reason: &str,
    ) -> Result<(), StreamError> {
        self.current_for(message_id)?;
        let message = streaming_message(conversation, message_id)?;
        if message.text.trim().is_empty() {
            message.text = reason.to_string();
        } else {
            if !message.text.ends_with('\n') {
                message.text.push('\n');
            }
            message.text.push('\n');
            message.text.push_str(reason);
        }
        message.failed = true;
        self.current = None;

        tracing::debug!(
            conversation = %conversation.id,
            message = message_id,
            reason,
            "stream failed"
        );
        Ok(())
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn current_message_id(&self) -> Option<&str> {
        self.current
            .as_ref()
            .map(|current| current.message_id.as_str())
    }

    /// Block tree of the streaming message as of the last accepted fragment.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        self.current
            .as_ref()
            .map(|current| current.blocks.as_slice())
            .unwrap_or_default()
    }

    fn current_for(&mut self, message_id: &str) -> Result<&mut CurrentStream, StreamError> {
        match self.current.as_mut() {
            Some(current) if current.message_id == message_id => Ok(current),
            _ => Err(StreamError::NotCurrent {
                message_id: message_id.to_string(),
            }),
        }
    }
}

fn streaming_message<'a>(
    conversation: &'a mut Conversation,
    message_id: &str,
) -> Result<&'a mut Message, StreamError> {
    conversation
        .messages
        .iter_mut()
        .rev()
        .find(|message| message.id == message_id && message.role == Role::Assistant)
        .ok_or_else(|| StreamError::NotCurrent {
            message_id: message_id.to_string(),
        })
}
