//! Resilient completion client for the taraflow TARA pipeline.
//!
//! Turns a structured request (prompt content plus generation parameters)
//! into a validated JSON payload. Owns connection reuse, per-call timeout,
//! retry with exponential backoff, and truncation detection. Transport-class
//! failures are retried up to the configured ceiling; truncated or
//! schema-invalid payloads escalate immediately because re-sending the same
//! request reproduces the same outcome.

mod error;
mod http;
mod payload;
mod request;
mod retry;

pub use error::CompletionError;
pub use http::HttpCompletionClient;
pub use payload::{extract_json, looks_truncated, parse_payload};
pub use request::{CompletionRequest, SchemaHint};
pub use retry::RetryPolicy;

use async_trait::async_trait;

/// The seam between the pipeline and the reasoning service. The production
/// implementation is [`HttpCompletionClient`]; tests substitute scripted
/// mocks.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<serde_json::Value, CompletionError>;
}

/// Configuration for the completion client. Built explicitly by the caller;
/// the client never reads ambient process state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer token for the completion endpoint.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Base URL of an OpenAI-style chat-completions API.
    pub api_base_url: String,
    /// Maximum attempts per call, including the first.
    pub max_retries: u32,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Upper bound any request's `max_output_tokens` must respect.
    pub output_token_ceiling: u32,
    /// Idle connections kept per host for reuse across calls.
    pub pool_max_idle: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "Pro/deepseek-ai/DeepSeek-V3.2-Exp".to_string(),
            api_base_url: "https://api.siliconflow.cn/v1".to_string(),
            max_retries: 5,
            timeout_secs: 120,
            output_token_ceiling: 16_000,
            pool_max_idle: 10,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_output_token_ceiling(mut self, ceiling: u32) -> Self {
        self.output_token_ceiling = ceiling;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.output_token_ceiling, 16_000);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::new()
            .with_api_key("sk-test")
            .with_model("test-model")
            .with_max_retries(2)
            .with_timeout(30);
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "test-model");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.timeout_secs, 30);
    }
}
