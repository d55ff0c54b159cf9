use std::sync::atomic::Ordering;
use std::sync::Arc;

use generation_provider::{
    CancelSignal, GenerationEvent, GenerationProvider, GenerationRequest, ProviderProfile,
    RequestId, Turn, TurnRole,
};
use million_chat::Block;
use session_store::{Attachment, Conversation, ConversationSummary, Message, Role, SessionStore};

use crate::attachments::content_parts;
use crate::error::ChatError;
use crate::persona::Persona;
use crate::stream::StreamAccumulator;

/// Reply text left behind when the user moves away from a live stream.
pub const ABANDONED_REASON: &str = "Stream abandoned";
pub const CANCELLED_REASON: &str = "Generation cancelled";
pub const INCOMPLETE_REASON: &str = "Generation ended before the reply was complete";

/// A started turn, ready to hand to a provider.
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    pub request: GenerationRequest,
    pub cancel: CancelSignal,
}

/// What applying one provider event did to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnUpdate {
    /// The event belonged to a stream that is no longer current.
    Ignored,
    Started,
    Streaming,
    Finished,
    Failed { reason: String },
}

#[derive(Debug)]
struct PendingTurn {
    request_id: RequestId,
    message_id: String,
    cancel: CancelSignal,
}

/// Drives turns for the active conversation and mirrors every change into the store.
///
/// Store write failures are logged and the in-memory conversation carries on; the next
/// successful write persists the full record again.
pub struct ConversationController {
    store: Arc<SessionStore>,
    provider: Arc<dyn GenerationProvider>,
    persona: Persona,
    conversation: Conversation,
    stream: StreamAccumulator,
    pending: Option<PendingTurn>,
    next_request_id: RequestId,
}

impl ConversationController {
    /// Resumes the conversation named by the store's active pointer, or starts a new one.
    pub fn new(
        store: Arc<SessionStore>,
        provider: Arc<dyn GenerationProvider>,
        persona: Persona,
    ) -> Self {
        let conversation = store
            .active()
            .and_then(|id| store.get(&id))
            .unwrap_or_default();

        tracing::info!(
            conversation = %conversation.id,
            messages = conversation.messages.len(),
            "controller ready"
        );

        Self {
            store,
            provider,
            persona,
            conversation,
            stream: StreamAccumulator::new(),
            pending: None,
            next_request_id: 1,
        }
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[must_use]
    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn set_persona(&mut self, persona: Persona) {
        self.persona = persona;
    }

    #[must_use]
    pub fn provider_profile(&self) -> ProviderProfile {
        self.provider.profile()
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.pending.is_some()
    }

    /// Block tree of the reply currently streaming; empty when idle.
    #[must_use]
    pub fn live_blocks(&self) -> &[Block] {
        self.stream.blocks()
    }

    /// Id of the assistant message currently streaming.
    #[must_use]
    pub fn live_message_id(&self) -> Option<&str> {
        self.stream.current_message_id()
    }

    /// Records the user message durably, then opens the assistant reply stream.
    pub fn begin_turn(
        &mut self,
        text: &str,
        attachments: Vec<Attachment>,
        cancel: CancelSignal,
    ) -> Result<PreparedTurn, ChatError> {
        if self.pending.is_some() || self.stream.is_streaming() {
            return Err(ChatError::StreamInFlight);
        }

        let text = text.trim();
        if text.is_empty() && attachments.is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        let history = history_turns(&self.conversation.messages);
        let parts = content_parts(&attachments, text);

        self.conversation
            .messages
            .push(Message::user(text, attachments));
        self.persist_conversation();
        self.activate_current();

        let message_id = self
            .stream
            .begin(&mut self.conversation)
            .map_err(|_| ChatError::StreamInFlight)?;
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        self.pending = Some(PendingTurn {
            request_id,
            message_id,
            cancel: Arc::clone(&cancel),
        });

        tracing::info!(
            conversation = %self.conversation.id,
            request_id,
            parts = parts.len(),
            "turn started"
        );

        Ok(PreparedTurn {
            request: GenerationRequest {
                request_id,
                history,
                parts,
                instructions: self.persona.instructions().to_string(),
            },
            cancel,
        })
    }

    /// Applies one provider event; events of any other request are ignored.
    pub fn apply_event(&mut self, event: GenerationEvent) -> TurnUpdate {
        let Some(pending) = &self.pending else {
            tracing::debug!(request_id = event.request_id(), "event without a live stream");
            return TurnUpdate::Ignored;
        };
        if event.request_id() != pending.request_id {
            tracing::debug!(
                request_id = event.request_id(),
                live = pending.request_id,
                "stale event ignored"
            );
            return TurnUpdate::Ignored;
        }
        let message_id = pending.message_id.clone();

        match event {
            GenerationEvent::Started { .. } => TurnUpdate::Started,
            GenerationEvent::Chunk { text, .. } => {
                match self
                    .stream
                    .append(&mut self.conversation, &message_id, &text)
                {
                    Ok(_) => TurnUpdate::Streaming,
                    Err(error) => {
                        tracing::debug!(%error, "fragment rejected");
                        TurnUpdate::Ignored
                    }
                }
            }
            GenerationEvent::Finished { .. } => {
                self.pending = None;
                if let Err(error) = self.stream.complete(&mut self.conversation, &message_id) {
                    tracing::warn!(%error, "stream completion rejected");
                }
                self.persist_conversation();
                tracing::info!(conversation = %self.conversation.id, "turn finished");
                TurnUpdate::Finished
            }
            GenerationEvent::Failed { error, .. } => {
                self.fail_turn(&error);
                TurnUpdate::Failed { reason: error }
            }
            GenerationEvent::Cancelled { .. } => {
                self.fail_turn(CANCELLED_REASON);
                TurnUpdate::Failed {
                    reason: CANCELLED_REASON.to_string(),
                }
            }
        }
    }

    /// Runs `turn` against the provider to completion, reporting each applied event.
    ///
    /// A provider that stops without a terminal event fails the reply.
    pub fn stream_turn(
        &mut self,
        turn: PreparedTurn,
        on_update: &mut dyn FnMut(&TurnUpdate, &ConversationController),
    ) {
        let provider = Arc::clone(&self.provider);
        let request_id = turn.request.request_id;

        let result = provider.generate(turn.request, turn.cancel, &mut |event| {
            let update = self.apply_event(event);
            on_update(&update, self);
        });

        let still_live = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.request_id == request_id);
        if still_live {
            let reason = match result {
                Err(error) => error,
                Ok(()) => INCOMPLETE_REASON.to_string(),
            };
            self.fail_turn(&reason);
            on_update(&TurnUpdate::Failed { reason }, self);
        }
    }

    /// Submits a prompt and streams the reply in one call.
    pub fn submit(
        &mut self,
        text: &str,
        attachments: Vec<Attachment>,
        cancel: CancelSignal,
        on_update: &mut dyn FnMut(&TurnUpdate, &ConversationController),
    ) -> Result<(), ChatError> {
        let turn = self.begin_turn(text, attachments, cancel)?;
        self.stream_turn(turn, on_update);
        Ok(())
    }

    /// Switches to a fresh, unsaved conversation.
    pub fn new_conversation(&mut self) {
        self.abandon_stream();
        self.conversation = Conversation::new();
        if let Err(error) = self.store.set_active(None) {
            tracing::warn!(%error, "failed to clear active conversation");
        }
    }

    /// Switches to the stored conversation whose id starts with `query`.
    pub fn open_conversation(&mut self, query: &str) -> Result<&Conversation, ChatError> {
        let id = self
            .store
            .resolve_id(query)
            .ok_or_else(|| ChatError::not_found(query))?;
        if id == self.conversation.id {
            return Ok(&self.conversation);
        }

        self.abandon_stream();
        self.conversation = self.store.get(&id).ok_or_else(|| ChatError::not_found(query))?;
        self.activate_current();
        Ok(&self.conversation)
    }

    /// Deletes a stored conversation; deleting the open one starts a new conversation.
    pub fn delete_conversation(&mut self, query: &str) -> Result<ConversationSummary, ChatError> {
        let id = self
            .store
            .resolve_id(query)
            .ok_or_else(|| ChatError::not_found(query))?;
        let summary = self
            .store
            .get(&id)
            .map(|conversation| conversation.summary())
            .ok_or_else(|| ChatError::not_found(query))?;

        if id == self.conversation.id {
            self.abandon_stream();
            self.conversation = Conversation::new();
        }
        if let Err(error) = self.store.remove(&id) {
            tracing::warn!(%error, conversation = %id, "failed to persist removal");
        }
        Ok(summary)
    }

    #[must_use]
    pub fn list(&self) -> Vec<ConversationSummary> {
        self.store.list()
    }

    #[must_use]
    pub fn search(&self, query: &str) -> Vec<ConversationSummary> {
        self.store.search(query)
    }

    fn abandon_stream(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        pending.cancel.store(true, Ordering::SeqCst);
        tracing::info!(request_id = pending.request_id, "stream abandoned");
        self.fail_turn(ABANDONED_REASON);
    }

    fn fail_turn(&mut self, reason: &str) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if let Err(error) = self
            .stream
            .fail(&mut self.conversation, &pending.message_id, reason)
        {
            tracing::warn!(%error, "stream failure rejected");
        }
        self.persist_conversation();
        tracing::info!(conversation = %self.conversation.id, reason, "turn failed");
    }

    fn persist_conversation(&mut self) {
        match self.store.upsert(&self.conversation) {
            Ok(stored) => self.conversation = stored,
            Err(error) => {
                tracing::warn!(%error, conversation = %self.conversation.id, "failed to persist conversation");
            }
        }
    }

    fn activate_current(&self) {
        if self.store.active().as_deref() == Some(self.conversation.id.as_str()) {
            return;
        }
        if let Err(error) = self.store.set_active(Some(&self.conversation.id)) {
            tracing::warn!(%error, "failed to persist active conversation");
        }
    }
}

/// Earlier turns replayed to the provider; failed replies are not model output.
fn history_turns(messages: &[Message]) -> Vec<Turn> {
    messages
        .iter()
        .filter(|message| !message.failed && !message.text.trim().is_empty())
        .map(|message| Turn {
            role: match message.role {
                Role::User => TurnRole::User,
                Role::Assistant => TurnRole::Model,
            },
            text: message.text.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_skips_failed_and_empty_messages() {
        let mut failed = Message::assistant();
        failed.text = "quota exceeded".to_string();
        failed.failed = true;
        let mut reply = Message::assistant();
        reply.text = "hi there".to_string();

        let turns = history_turns(&[
            Message::user("hello", Vec::new()),
            failed,
            Message::user("again", Vec::new()),
            reply,
            Message::assistant(),
        ]);

        assert_eq!(
            turns,
            vec![
                Turn {
                    role: TurnRole::User,
                    text: "hello".to_string(),
                },
                Turn {
                    role: TurnRole::User,
                    text: "again".to_string(),
                },
                Turn {
                    role: TurnRole::Model,
                    text: "hi there".to_string(),
                },
            ]
        );
    }
}
