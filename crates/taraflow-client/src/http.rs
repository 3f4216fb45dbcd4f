//! HTTP transport for the completion service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use crate::error::CompletionError;
use crate::payload::parse_payload;
use crate::request::CompletionRequest;
use crate::retry::RetryPolicy;
use crate::{ClientConfig, CompletionService};

#[derive(Debug, Serialize)]
struct ChatCompletionBody {
    model: String,
    messages: Vec<Message>,
    response_format: ResponseFormat,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: String,
}

/// Completion client backed by a pooled HTTP connection to an OpenAI-style
/// chat-completions endpoint. One instance serves all concurrent units of a
/// run; the connection pool is the only shared resource.
pub struct HttpCompletionClient {
    config: ClientConfig,
    retry: RetryPolicy,
    http_client: ReqwestClient,
}

impl HttpCompletionClient {
    pub fn new(config: ClientConfig) -> Result<Self, CompletionError> {
        if config.api_key.trim().is_empty() {
            return Err(CompletionError::MissingApiKey);
        }

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle)
            .build()?;

        let retry = RetryPolicy::new(config.max_retries);

        Ok(Self {
            config,
            retry,
            http_client,
        })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn call_once(
        &self,
        request: &CompletionRequest,
    ) -> Result<serde_json::Value, CompletionError> {
        let body = ChatCompletionBody {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: request.content.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: format!(
                        "{}\nReturn a single JSON object shaped like: {}",
                        request.instruction, request.schema.example
                    ),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        let url = format!("{}/chat/completions", self.config.api_base_url);
        debug!("sending completion request to {}", url);

        let send = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send();

        let response = timeout(Duration::from_secs(self.config.timeout_secs), send)
            .await
            .map_err(|_| CompletionError::Timeout {
                timeout_secs: self.config.timeout_secs,
            })??;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let envelope: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            CompletionError::SchemaValidation(format!("malformed completion envelope: {e}"))
        })?;

        let choice = envelope.choices.first().ok_or_else(|| {
            CompletionError::SchemaValidation("no choices in completion envelope".to_string())
        })?;

        parse_payload(
            &choice.message.content,
            choice.finish_reason.as_deref(),
            &request.schema,
            request.max_output_tokens,
        )
    }
}

#[async_trait]
impl CompletionService for HttpCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<serde_json::Value, CompletionError> {
        request.validate(self.config.output_token_ceiling)?;

        let request = &request;
        self.retry
            .run(|attempt| async move {
                debug!(
                    "issuing completion call, attempt {}/{}",
                    attempt + 1,
                    self.retry.max_attempts
                );
                self.call_once(request).await
            })
            .await
    }
}
