#![allow(dead_code)]

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use chat_client::controller::{ConversationController, TurnUpdate};
use chat_client::persona::Persona;
use generation_provider::{
    CancelSignal, GenerationEvent, GenerationProvider, GenerationRequest, ProviderProfile,
};
use generation_provider_mock::MockProvider;
use session_store::{KeyValueStore, MemoryKeyValueStore, SessionStore};

pub fn memory_backend() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryKeyValueStore::new())
}

pub fn cancel_signal() -> CancelSignal {
    Arc::new(AtomicBool::new(false))
}

pub fn mock(chunks: &[&str]) -> MockProvider {
    MockProvider::new(chunks.iter().map(|chunk| chunk.to_string()).collect())
}

pub fn controller_with(
    backend: &Arc<dyn KeyValueStore>,
    provider: impl GenerationProvider,
) -> ConversationController {
    let store = Arc::new(SessionStore::load(Arc::clone(backend)));
    ConversationController::new(store, Arc::new(provider), Persona::default())
}

/// Submits `text` and returns every update the controller reported.
pub fn submit_collect(controller: &mut ConversationController, text: &str) -> Vec<TurnUpdate> {
    let mut updates = Vec::new();
    controller
        .submit(text, Vec::new(), cancel_signal(), &mut |update, _| {
            updates.push(update.clone())
        })
        .expect("submit should be accepted");
    updates
}

/// Provider that emits a fixed event script, stamped with the live request id, and
/// then returns `outcome`.
pub struct ScriptedProvider {
    script: Vec<ScriptedEvent>,
    outcome: Result<(), String>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

#[derive(Debug, Clone)]
pub enum ScriptedEvent {
    Started,
    Chunk(&'static str),
    Finished,
}

impl ScriptedProvider {
    pub fn new(script: Vec<ScriptedEvent>, outcome: Result<(), String>) -> Self {
        Self {
            script,
            outcome,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<GenerationRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl GenerationProvider for ScriptedProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: "scripted".to_string(),
            model_id: "scripted-model".to_string(),
        }
    }

    fn generate(
        &self,
        request: GenerationRequest,
        _cancel: CancelSignal,
        emit: &mut dyn FnMut(GenerationEvent),
    ) -> Result<(), String> {
        let request_id = request.request_id;
        lock_unpoisoned(&self.requests).push(request);

        for event in &self.script {
            emit(match event {
                ScriptedEvent::Started => GenerationEvent::Started { request_id },
                ScriptedEvent::Chunk(text) => GenerationEvent::Chunk {
                    request_id,
                    text: text.to_string(),
                },
                ScriptedEvent::Finished => GenerationEvent::Finished { request_id },
            });
        }
        self.outcome.clone()
    }
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
