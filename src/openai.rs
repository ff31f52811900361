//! OpenAI client construction shared by the SDK completer and the OpenAI embedder.

use crate::error::{RagError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI SDK requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client for the given key and API base.
///
/// The key is passed explicitly rather than read from the environment so that
/// the settings loaded at startup stay the single source of configuration.
pub fn create_client(api_key: &str, api_base: &str) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api_key, api_base, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    api_key: &str,
    api_base: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    if api_key.trim().is_empty() {
        return Err(RagError::Config("OPENAI_API_KEY is not set".to_string()));
    }

    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_key(api_key.trim())
        .with_api_base(api_base.trim_end_matches('/'));

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_rejected() {
        let err = create_client("  ", "https://api.openai.com/v1").unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn test_client_builds_with_key() {
        assert!(create_client("sk-test", "https://api.openai.com/v1/").is_ok());
    }
}
