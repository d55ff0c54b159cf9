//! Deterministic mock implementation of the shared `generation_provider` contract.
//!
//! This crate contains no transport logic and is intended for offline runs and
//! contract-level integration testing of the chat client.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use generation_provider::{
    CancelSignal, GenerationEvent, GenerationProvider, GenerationRequest, ProviderProfile,
};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";
/// Model identifier reported by every mock profile.
pub const MOCK_MODEL_ID: &str = "mock-flash";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScriptedFailure {
    after_fragments: usize,
    error: String,
}

/// Deterministic provider that streams a fixed script word by word.
#[derive(Debug, Clone)]
pub struct MockProvider {
    chunks: Vec<String>,
    failure: Option<ScriptedFailure>,
    start_delay: Duration,
    fragment_delay: Duration,
}

impl MockProvider {
    /// Creates a mock provider that streams `chunks` without any pacing delay.
    #[must_use]
    pub fn new(chunks: Vec<String>) -> Self {
        Self {
            chunks,
            failure: None,
            start_delay: Duration::ZERO,
            fragment_delay: Duration::ZERO,
        }
    }

    /// Fails the stream with `error` once `after_fragments` fragments were emitted.
    #[must_use]
    pub fn with_failure_after(mut self, after_fragments: usize, error: impl Into<String>) -> Self {
        self.failure = Some(ScriptedFailure {
            after_fragments,
            error: error.into(),
        });
        self
    }

    /// Paces the stream like a remote model: one pause before the first fragment and
    /// one after every fragment.
    #[must_use]
    pub fn with_delays(mut self, start_delay: Duration, fragment_delay: Duration) -> Self {
        self.start_delay = start_delay;
        self.fragment_delay = fragment_delay;
        self
    }

    /// Splits the script into the word-sized fragments the provider emits.
    fn fragments(&self) -> Vec<String> {
        let mut fragments = Vec::new();
        for chunk in &self.chunks {
            let mut pending_token = String::new();
            for ch in chunk.chars() {
                pending_token.push(ch);
                if matches!(ch, ' ' | '\n') {
                    fragments.push(std::mem::take(&mut pending_token));
                }
            }
            if !pending_token.is_empty() {
                fragments.push(pending_token);
            }
        }
        fragments
    }

    fn pause(delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    const START_DELAY_MS: u64 = 200;
    const FRAGMENT_DELAY_MS: u64 = 30;
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(vec![
            "# Offline mode\n".to_string(),
            "No model is configured, so this **scripted reply** streams from `MockProvider`.\n"
                .to_string(),
            "\n".to_string(),
            "## What the renderer handles\n".to_string(),
            "- **bold** spans and `inline code`\n".to_string(),
            "- Headings at three levels\n".to_string(),
            "1. Ordered items keep their numbers\n".to_string(),
            "2. Long lines wrap under the marker\n".to_string(),
            "\n".to_string(),
            "### Fenced code\n".to_string(),
            "```rust\n".to_string(),
            "fn main() {\n".to_string(),
            "    println!(\"Hello, terminal\");\n".to_string(),
            "}\n".to_string(),
            "```\n".to_string(),
            "\n".to_string(),
            "Set `MILLION_CHAT_PROVIDER` to choose another backend.\n".to_string(),
        ])
        .with_delays(
            Duration::from_millis(Self::START_DELAY_MS),
            Duration::from_millis(Self::FRAGMENT_DELAY_MS),
        )
    }
}

impl GenerationProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: MOCK_MODEL_ID.to_string(),
        }
    }

    fn generate(
        &self,
        request: GenerationRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(GenerationEvent),
    ) -> Result<(), String> {
        let request_id = request.request_id;

        emit(GenerationEvent::Started { request_id });
        Self::pause(self.start_delay);

        for (emitted, text) in self.fragments().into_iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                emit(GenerationEvent::Cancelled { request_id });
                return Ok(());
            }

            if let Some(failure) = &self.failure {
                if emitted == failure.after_fragments {
                    emit(GenerationEvent::Failed {
                        request_id,
                        error: failure.error.clone(),
                    });
                    return Ok(());
                }
            }

            emit(GenerationEvent::Chunk { request_id, text });
            Self::pause(self.fragment_delay);
        }

        if cancel.load(Ordering::SeqCst) {
            emit(GenerationEvent::Cancelled { request_id });
        } else if let Some(failure) = &self.failure {
            // A failure scripted past the end of the script still fails the stream.
            emit(GenerationEvent::Failed {
                request_id,
                error: failure.error.clone(),
            });
        } else {
            emit(GenerationEvent::Finished { request_id });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use super::*;

    fn collect_events(provider: &MockProvider, cancel: CancelSignal) -> Vec<GenerationEvent> {
        let mut events = Vec::new();
        provider
            .generate(
                GenerationRequest {
                    request_id: 7,
                    history: Vec::new(),
                    parts: vec![generation_provider::ContentPart::text("test")],
                    instructions: "system instructions".to_string(),
                },
                cancel,
                &mut |event| events.push(event),
            )
            .expect("mock run should succeed");
        events
    }

    fn chunk_texts(events: &[GenerationEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|event| match event {
                GenerationEvent::Chunk { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn profile_exposes_explicit_mock_provider_identity() {
        let profile = MockProvider::new(Vec::new()).profile();

        assert_eq!(profile.provider_id, MOCK_PROVIDER_ID);
        assert_eq!(profile.model_id, MOCK_MODEL_ID);
    }

    #[test]
    fn generate_emits_started_word_chunks_and_finished() {
        let provider = MockProvider::new(vec!["one two\nthree".to_string()]);
        let events = collect_events(&provider, Arc::new(AtomicBool::new(false)));

        assert_eq!(events.first(), Some(&GenerationEvent::Started { request_id: 7 }));
        assert_eq!(events.last(), Some(&GenerationEvent::Finished { request_id: 7 }));
        assert_eq!(chunk_texts(&events), vec!["one ", "two\n", "three"]);
    }

    #[test]
    fn generate_emits_cancelled_when_cancel_is_set() {
        let provider = MockProvider::new(vec!["ignored".to_string()]);
        let events = collect_events(&provider, Arc::new(AtomicBool::new(true)));

        assert_eq!(
            events,
            vec![
                GenerationEvent::Started { request_id: 7 },
                GenerationEvent::Cancelled { request_id: 7 },
            ]
        );
    }

    #[test]
    fn scripted_failure_stops_after_requested_fragments() {
        let provider =
            MockProvider::new(vec!["a b c d".to_string()]).with_failure_after(2, "quota exceeded");
        let events = collect_events(&provider, Arc::new(AtomicBool::new(false)));

        assert_eq!(chunk_texts(&events), vec!["a ", "b "]);
        assert_eq!(
            events.last(),
            Some(&GenerationEvent::Failed {
                request_id: 7,
                error: "quota exceeded".to_string(),
            })
        );
    }

    #[test]
    fn failure_past_end_of_script_still_fails() {
        let provider = MockProvider::new(vec!["a".to_string()]).with_failure_after(10, "late");
        let events = collect_events(&provider, Arc::new(AtomicBool::new(false)));

        assert_eq!(chunk_texts(&events), vec!["a"]);
        assert!(matches!(events.last(), Some(GenerationEvent::Failed { .. })));
    }

    #[test]
    fn default_script_reassembles_into_a_fenced_reply() {
        let provider = MockProvider::default().with_delays(Duration::ZERO, Duration::ZERO);
        let events = collect_events(&provider, Arc::new(AtomicBool::new(false)));
        let reply: String = chunk_texts(&events).concat();

        assert!(reply.starts_with("# Offline mode\n"));
        assert!(reply.contains("```rust\nfn main() {\n"));
        assert!(matches!(events.last(), Some(GenerationEvent::Finished { .. })));
    }
}
