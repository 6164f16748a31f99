//! OpenAI-compatible client configuration with sensible defaults.

use crate::config::SummarizationSettings;
use crate::error::{FrontlineError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for completion requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create a client for the configured completion endpoint.
pub fn create_client(settings: &SummarizationSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let timeout = if settings.timeout_seconds == 0 {
        DEFAULT_TIMEOUT_SECS
    } else {
        settings.timeout_seconds
    };

    create_client_with_timeout(&settings.api_base, api_key, Duration::from_secs(timeout))
}

/// Create a client with a custom base URL and timeout.
pub fn create_client_with_timeout(
    api_base: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FrontlineError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base)
        .with_api_key(api_key);

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry()))
}

/// A backoff that gives up immediately, so each request is sent exactly once.
fn no_retry() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let settings = SummarizationSettings::default();
        assert!(create_client(&settings, "gsk_test").is_ok());
    }

    #[test]
    fn test_backoff_never_retries() {
        use backoff::backoff::Backoff;

        let mut backoff = no_retry();
        std::thread::sleep(Duration::from_millis(1));
        assert_eq!(backoff.next_backoff(), None);
    }
}
