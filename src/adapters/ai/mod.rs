//! Completion Provider Adapters.
//!
//! Implementations of the CompletionProvider port.
//!
//! ## Available Adapters
//!
//! - `MockCompletionProvider` - Deterministic provider used without an API key and in tests
//! - `OpenAICompatibleProvider` - Any `/chat/completions` endpoint (Groq by default)

mod mock_provider;
mod openai_provider;

use std::sync::Arc;

pub use mock_provider::{MockCompletionProvider, MockResponse, MOCK_DEFAULT_CONTENT};
pub use openai_provider::{
    OpenAICompatibleConfig, OpenAICompatibleProvider, DEFAULT_BASE_URL, DEFAULT_MODEL,
};

use crate::config::{AiConfig, AiProvider};
use crate::ports::{CompletionProvider, ProviderError};

/// Builds the provider selected by configuration.
///
/// The choice is made once; callers hold the returned handle for the process
/// lifetime.
pub fn provider_from_config(
    config: &AiConfig,
) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    match config.provider {
        AiProvider::Mock => {
            tracing::info!("Using mock completion provider");
            Ok(Arc::new(MockCompletionProvider::new()))
        }
        AiProvider::OpenaiCompatible => {
            let api_key = config
                .api_key_value()
                .ok_or(ProviderError::AuthenticationFailed)?;
            let provider = OpenAICompatibleProvider::new(
                OpenAICompatibleConfig::new(api_key)
                    .with_model(config.model.clone())
                    .with_base_url(config.base_url.clone())
                    .with_timeout(config.timeout())
                    .with_max_retries(config.max_retries),
            )?;
            tracing::info!(
                base_url = %config.base_url,
                model = %config.model,
                "Using OpenAI-compatible completion provider"
            );
            Ok(Arc::new(provider))
        }
    }
}
