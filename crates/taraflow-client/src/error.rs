//! Error taxonomy for completion calls.

use thiserror::Error;

/// Failure modes of a single stage call, scoped to the completion boundary.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("failed to reach completion endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("completion endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("completion output truncated near the {max_output_tokens}-token output ceiling")]
    Truncated { max_output_tokens: u32 },

    #[error("completion payload failed schema validation: {0}")]
    SchemaValidation(String),

    #[error("invalid completion request: {0}")]
    InvalidRequest(String),

    #[error("API key not provided in client configuration")]
    MissingApiKey,

    #[error("gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl CompletionError {
    /// Transport-class failures are worth retrying. Truncation, schema and
    /// request-validation failures are not: re-sending an unchanged request
    /// reproduces the same result.
    pub fn is_retryable(&self) -> bool {
        match self {
            CompletionError::Transport(_) | CompletionError::Timeout { .. } => true,
            CompletionError::Api { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            _ => false,
        }
    }
}
