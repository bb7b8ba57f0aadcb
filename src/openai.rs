//! OpenAI-compatible client configuration with sensible defaults.
//!
//! The completion endpoint may be any OpenAI-compatible host; the base URL
//! and API key environment variable are configurable.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client against the default OpenAI endpoint.
///
/// Uses a 5-minute timeout by default to prevent hung API calls.
pub fn create_client() -> Client<OpenAIConfig> {
    create_client_with_config(OpenAIConfig::default())
}

/// Create a client against an OpenAI-compatible endpoint.
///
/// `base_url` overrides the API host (e.g. a hosted inference provider);
/// `api_key_env` names the environment variable holding the key.
pub fn create_compatible_client(base_url: Option<&str>, api_key_env: &str) -> Client<OpenAIConfig> {
    let mut config = OpenAIConfig::default();
    if let Some(url) = base_url {
        config = config.with_api_base(url.trim_end_matches('/'));
    }
    if let Ok(key) = std::env::var(api_key_env) {
        config = config.with_api_key(key);
    }
    create_client_with_config(config)
}

fn create_client_with_config(config: OpenAIConfig) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(config).with_http_client(http_client)
}
