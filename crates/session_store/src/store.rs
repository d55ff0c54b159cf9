use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SessionStoreError;
use crate::kv::KeyValueStore;
use crate::schema::{now_millis, Conversation, ConversationSummary};

/// Key holding the JSON array of every conversation, newest first.
pub const SESSIONS_KEY: &str = "million_ai_sessions";
/// Key holding the id of the conversation to resume on start.
pub const ACTIVE_KEY: &str = "million_ai_current_id";

struct StoreState {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    last_stamp: i64,
}

/// Conversation index mirrored to a [`KeyValueStore`].
///
/// Every mutation holds the state lock across its read-modify-write of the backing
/// store, so concurrent callers serialize.
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    state: Mutex<StoreState>,
}

impl SessionStore {
    /// Loads persisted state. Missing, unreadable, or undecodable state yields an
    /// empty store; the failure is logged, never returned.
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let conversations = read_conversations(backend.as_ref());
        let active_id = read_active_id(backend.as_ref())
            .filter(|id| conversations.iter().any(|conversation| &conversation.id == id));
        let last_stamp = conversations
            .iter()
            .map(|conversation| conversation.updated_at)
            .max()
            .unwrap_or(0);

        tracing::debug!(
            conversations = conversations.len(),
            active = active_id.as_deref(),
            "session store loaded"
        );

        Self {
            backend,
            state: Mutex::new(StoreState {
                conversations,
                active_id,
                last_stamp,
            }),
        }
    }

    /// Inserts or totally replaces the conversation with the same id, stamps it,
    /// freezes its title once it has a user message, re-sorts the index, and persists it.
    ///
    /// Returns the stored record. When persisting fails the in-memory index still
    /// holds the new record and the error reports the lost durability.
    pub fn upsert(&self, conversation: &Conversation) -> Result<Conversation, SessionStoreError> {
        let mut state = self.lock_state();
        let existing = state
            .conversations
            .iter()
            .position(|stored| stored.id == conversation.id);

        let mut record = conversation.clone();
        let previous_stamp = existing
            .map(|index| state.conversations[index].updated_at)
            .unwrap_or(0)
            .max(conversation.updated_at);
        record.updated_at = next_stamp(&mut state, previous_stamp);

        // Only a title derived from a user message is frozen; placeholders are not.
        let frozen_title = existing
            .map(|index| &state.conversations[index])
            .filter(|stored| stored.has_user_message() && !stored.title.is_empty())
            .map(|stored| stored.title.clone());
        record.title = frozen_title
            .or_else(|| record.derive_title())
            .unwrap_or_default();

        match existing {
            Some(index) => state.conversations[index] = record.clone(),
            None => state.conversations.push(record.clone()),
        }
        sort_newest_first(&mut state.conversations);

        tracing::debug!(
            conversation = %record.id,
            messages = record.messages.len(),
            updated_at = record.updated_at,
            "conversation upserted"
        );

        self.persist_conversations(&state.conversations)?;
        Ok(record)
    }

    /// Summaries whose title or any message text contains `query`, ignoring case.
    /// An empty query returns the whole index. Order is newest first.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<ConversationSummary> {
        let needle = query.to_lowercase();
        self.lock_state()
            .conversations
            .iter()
            .filter(|conversation| needle.is_empty() || conversation.matches_lowercase(&needle))
            .map(Conversation::summary)
            .collect()
    }

    /// The full index, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<ConversationSummary> {
        self.search("")
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.lock_state()
            .conversations
            .iter()
            .find(|conversation| conversation.id == id)
            .cloned()
    }

    /// Resolves a unique id prefix (or full id) to a conversation id.
    #[must_use]
    pub fn resolve_id(&self, prefix: &str) -> Option<String> {
        if prefix.is_empty() {
            return None;
        }

        let state = self.lock_state();
        if let Some(exact) = state
            .conversations
            .iter()
            .find(|conversation| conversation.id == prefix)
        {
            return Some(exact.id.clone());
        }

        let mut matches = state
            .conversations
            .iter()
            .filter(|conversation| conversation.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only.id.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_state().conversations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persists the active pointer; `None` clears it.
    pub fn set_active(&self, id: Option<&str>) -> Result<(), SessionStoreError> {
        let mut state = self.lock_state();
        state.active_id = id.map(str::to_string);
        match id {
            Some(id) => self.backend.set(ACTIVE_KEY, id),
            None => self.backend.remove(ACTIVE_KEY),
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<String> {
        self.lock_state().active_id.clone()
    }

    /// Deletes a conversation and clears the active pointer if it pointed there.
    /// Returns `Ok(false)` when no conversation had that id.
    pub fn remove(&self, id: &str) -> Result<bool, SessionStoreError> {
        let mut state = self.lock_state();
        let Some(index) = state
            .conversations
            .iter()
            .position(|conversation| conversation.id == id)
        else {
            return Ok(false);
        };

        state.conversations.remove(index);
        tracing::debug!(conversation = id, "conversation removed");
        self.persist_conversations(&state.conversations)?;

        if state.active_id.as_deref() == Some(id) {
            state.active_id = None;
            self.backend.remove(ACTIVE_KEY)?;
        }

        Ok(true)
    }

    fn persist_conversations(
        &self,
        conversations: &[Conversation],
    ) -> Result<(), SessionStoreError> {
        let encoded = serde_json::to_string(conversations)
            .map_err(|source| SessionStoreError::json_serialize(SESSIONS_KEY, source))?;
        self.backend.set(SESSIONS_KEY, &encoded).inspect_err(|error| {
            tracing::warn!(%error, "failed to persist conversation index");
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Strictly increasing across the whole store, so the newest-first order has no ties.
fn next_stamp(state: &mut StoreState, previous: i64) -> i64 {
    let stamp = now_millis()
        .max(state.last_stamp.saturating_add(1))
        .max(previous.saturating_add(1));
    state.last_stamp = stamp;
    stamp
}

fn sort_newest_first(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

fn read_conversations(backend: &dyn KeyValueStore) -> Vec<Conversation> {
    let raw = match backend.get(SESSIONS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(error) => {
            tracing::warn!(%error, "conversation index unreadable; starting with empty history");
            return Vec::new();
        }
    };

    let mut conversations = match serde_json::from_str::<Vec<Conversation>>(&raw) {
        Ok(conversations) => conversations,
        Err(error) => {
            tracing::warn!(%error, "conversation index corrupt; starting with empty history");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    conversations.retain(|conversation| seen.insert(conversation.id.clone()));
    sort_newest_first(&mut conversations);
    conversations
}

fn read_active_id(backend: &dyn KeyValueStore) -> Option<String> {
    match backend.get(ACTIVE_KEY) {
        Ok(value) => value
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
        Err(error) => {
            tracing::warn!(%error, "active conversation pointer unreadable");
            None
        }
    }
}
