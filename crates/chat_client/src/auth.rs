use std::sync::Arc;

use session_store::{KeyValueStore, SessionStoreError};

/// Key holding the durable "authenticated" flag.
pub const AUTH_KEY: &str = "million_ai_auth";
const AUTH_FLAG: &str = "true";

/// Shared-secret gate in front of the chat surface.
///
/// Without a configured secret the gate is open.
pub struct AuthGate {
    backend: Arc<dyn KeyValueStore>,
    secret: Option<String>,
}

impl AuthGate {
    pub fn new(backend: Arc<dyn KeyValueStore>, secret: Option<String>) -> Self {
        Self { backend, secret }
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.secret.is_some()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        if !self.is_required() {
            return true;
        }

        match self.backend.get(AUTH_KEY) {
            Ok(value) => value.as_deref() == Some(AUTH_FLAG),
            Err(error) => {
                tracing::warn!(%error, "auth flag unreadable");
                false
            }
        }
    }

    /// Compares `candidate` with the secret and persists the flag on a match.
    pub fn try_unlock(&self, candidate: &str) -> Result<bool, SessionStoreError> {
        let Some(secret) = &self.secret else {
            return Ok(true);
        };

        if candidate != secret {
            tracing::info!("access denied");
            return Ok(false);
        }

        self.backend.set(AUTH_KEY, AUTH_FLAG)?;
        Ok(true)
    }
}
