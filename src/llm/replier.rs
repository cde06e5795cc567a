//! Core `ReplyGenerator` trait and `GeminiClient` implementation.
//!
//! `GeminiClient` issues a single non-streaming `generateContent` request to
//! the Google generative-language API per run.  All connection details
//! (`base_url`, `model`, sampling parameters, timeout) come from
//! [`LlmConfig`]; the API key is passed in explicitly after startup
//! resolution.  Failures are fatal — nothing here retries.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::llm::persona::build_request;

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Errors that can occur while generating a reply.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("generation request timed out")]
    Timeout,

    /// The service answered with a non-success status.  Covers invalid or
    /// missing credentials (401/403) as well as service-side errors.
    #[error("generation API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse generation response: {0}")]
    Parse(String),

    /// The service returned a response with no usable text content.
    #[error("generation returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ReplyGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for reply generation.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn ReplyGenerator>`.
///
/// # Contract
///
/// * `user_text` is a non-empty transcript; the caller must not invoke this
///   for an empty one.
/// * Exactly one request is issued per call; errors are never retried.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn reply(&self, user_text: &str) -> Result<String, GenerationError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls the Gemini `generateContent` endpoint.
///
/// The request carries the fixed persona instruction and sampling
/// configuration built by [`build_request`].
pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl GeminiClient {
    /// Build a `GeminiClient` from application config and a resolved API key.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn new(config: &LlmConfig, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            api_key,
        }
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    /// Send `user_text` to Gemini and return the generated reply text.
    async fn reply(&self, user_text: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let body = build_request(user_text, &self.config);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        let reply = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(GenerationError::EmptyResponse)?
            .trim()
            .to_string();

        if reply.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(reply)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> LlmConfig {
        LlmConfig::default()
    }

    #[test]
    fn new_builds_without_panic() {
        let _client = GeminiClient::new(&make_config(), "test-key".into());
    }

    /// Verify that `GeminiClient` is object-safe (usable as `dyn ReplyGenerator`).
    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn ReplyGenerator> =
            Box::new(GeminiClient::new(&make_config(), "test-key".into()));
        drop(client);
    }

    #[test]
    fn timeout_maps_from_reqwest() {
        // A reqwest timeout error must surface as GenerationError::Timeout;
        // covered indirectly: the From impl keys on is_timeout().
        let e = GenerationError::Timeout;
        assert!(e.to_string().contains("timed out"));
    }

    #[test]
    fn api_error_display_includes_status() {
        let e = GenerationError::Api {
            status: 403,
            message: "API key not valid".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("API key not valid"));
    }
}
