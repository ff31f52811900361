//! Chat-completion strategies.
//!
//! Two interchangeable ways to reach an OpenAI-compatible chat endpoint: the
//! async-openai SDK, or a plain HTTP POST. The strategy is picked once from
//! settings when the service starts.

mod http;
mod sdk;

pub use http::HttpCompleter;
pub use sdk::SdkCompleter;

use crate::config::{LlmBackend, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Maximum tokens generated per answer.
pub const MAX_TOKENS: u32 = 1000;

/// Sampling temperature for answers.
pub const TEMPERATURE: f32 = 0.7;

/// A chat-completion backend.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Send a system instruction and a user message; return the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Whether the underlying client has been constructed.
    fn is_initialized(&self) -> bool;
}

/// Build the configured completer. No client is constructed yet.
pub fn create_completer(settings: &Settings) -> Arc<dyn ChatCompleter> {
    let api_key = settings.openai_api_key().unwrap_or_default();
    match settings.llm.backend {
        LlmBackend::Sdk => Arc::new(SdkCompleter::new(
            api_key,
            &settings.openai.base_url,
            &settings.llm.model,
        )),
        LlmBackend::Http => Arc::new(HttpCompleter::new(
            api_key,
            &settings.openai.base_url,
            &settings.llm.model,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection_is_lazy() {
        let mut settings = Settings::default();
        settings.openai.api_key = Some("sk-test".to_string());

        let sdk = create_completer(&settings);
        assert_eq!(sdk.model(), "gpt-4o-mini");
        assert!(!sdk.is_initialized());

        settings.llm.backend = LlmBackend::Http;
        settings.llm.model = "gpt-4o".to_string();
        let http = create_completer(&settings);
        assert_eq!(http.model(), "gpt-4o");
        assert!(!http.is_initialized());
    }
}
