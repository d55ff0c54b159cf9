use std::sync::Arc;

use generation_provider::{GenerationProvider, ProviderInitError};
use generation_provider_mock::{MockProvider, MOCK_PROVIDER_ID};

pub const DEFAULT_PROVIDER_ID: &str = MOCK_PROVIDER_ID;

/// Resolves a provider id from configuration into a ready provider.
pub fn provider_for_id(provider_id: &str) -> Result<Arc<dyn GenerationProvider>, ProviderInitError> {
    match provider_id {
        MOCK_PROVIDER_ID => Ok(Arc::new(MockProvider::default())),
        unknown => Err(ProviderInitError::unsupported(unknown, &[MOCK_PROVIDER_ID])),
    }
}
