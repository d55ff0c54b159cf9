//! Minimal provider-agnostic contract for streaming one model reply.
//!
//! This crate defines only the request shape, the streamed lifecycle events, and the
//! provider trait. Transport details and conversation bookkeeping live elsewhere.

use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};

/// Identifier for one generation request.
pub type RequestId = u64;

/// Shared cancellation flag for a request.
pub type CancelSignal = Arc<AtomicBool>;

/// A configured provider id that could not be turned into a working provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    provider_id: String,
    reason: String,
}

impl ProviderInitError {
    #[must_use]
    pub fn new(provider_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            reason: reason.into(),
        }
    }

    /// No provider is registered under `provider_id`; `available` lists the ids that are.
    #[must_use]
    pub fn unsupported(provider_id: impl Into<String>, available: &[&str]) -> Self {
        Self::new(
            provider_id,
            format!("unsupported provider; available: {}", available.join(", ")),
        )
    }

    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot start provider '{}': {}", self.provider_id, self.reason)
    }
}

impl std::error::Error for ProviderInitError {}

/// One piece of the current user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text { text: String },
    /// Binary content; `data` is base64 without any `data:` URI header.
    InlineData { mime_type: String, data: String },
}

impl ContentPart {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

/// A completed earlier turn, replayed as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

/// Input required to start a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub request_id: RequestId,
    pub history: Vec<Turn>,
    pub parts: Vec<ContentPart>,
    pub instructions: String,
}

/// Provider-emitted lifecycle event for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    Started { request_id: RequestId },
    Chunk { request_id: RequestId, text: String },
    Finished { request_id: RequestId },
    Failed { request_id: RequestId, error: String },
    Cancelled { request_id: RequestId },
}

impl GenerationEvent {
    /// Returns the request identifier associated with this event.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Started { request_id }
            | Self::Chunk { request_id, .. }
            | Self::Finished { request_id }
            | Self::Failed { request_id, .. }
            | Self::Cancelled { request_id } => *request_id,
        }
    }

    /// Returns true when this event terminates the request lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}

/// Immutable metadata describing a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Provider interface for streaming one reply.
pub trait GenerationProvider: Send + Sync + 'static {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Executes a request and emits lifecycle events in provider order.
    ///
    /// Providers check `cancel` between fragments and emit `Cancelled` once it is set.
    /// Returning `Err` without a terminal event is reported to the caller as a failure.
    fn generate(
        &self,
        request: GenerationRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(GenerationEvent),
    ) -> Result<(), String>;
}
