//! Completion requests and the schema hints validated against them.

use crate::error::CompletionError;

/// Declares the top-level keys a caller expects back, plus an example JSON
/// object the model is shown verbatim.
#[derive(Debug, Clone)]
pub struct SchemaHint {
    pub required_keys: &'static [&'static str],
    pub example: &'static str,
}

impl SchemaHint {
    pub fn new(required_keys: &'static [&'static str], example: &'static str) -> Self {
        Self {
            required_keys,
            example,
        }
    }
}

/// One completion request: prompt content plus generation parameters.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System-level role description.
    pub system: String,
    /// Structured context for the call, usually a JSON document.
    pub content: String,
    /// Task instruction appended after the context.
    pub instruction: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub schema: SchemaHint,
}

impl CompletionRequest {
    /// Local parameter validation. Failures here are caller bugs and are
    /// never retried.
    pub fn validate(&self, output_token_ceiling: u32) -> Result<(), CompletionError> {
        if self.content.trim().is_empty() {
            return Err(CompletionError::InvalidRequest(
                "request content must not be empty".to_string(),
            ));
        }
        if self.instruction.trim().is_empty() {
            return Err(CompletionError::InvalidRequest(
                "request instruction must not be empty".to_string(),
            ));
        }
        if self.max_output_tokens == 0 {
            return Err(CompletionError::InvalidRequest(
                "max_output_tokens must be a positive integer".to_string(),
            ));
        }
        if self.max_output_tokens > output_token_ceiling {
            return Err(CompletionError::InvalidRequest(format!(
                "max_output_tokens {} exceeds the configured ceiling {}",
                self.max_output_tokens, output_token_ceiling
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(CompletionError::InvalidRequest(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(max_output_tokens: u32, temperature: f64) -> CompletionRequest {
        CompletionRequest {
            system: "system".to_string(),
            content: "{\"asset\":{}}".to_string(),
            instruction: "assess".to_string(),
            temperature,
            max_output_tokens,
            schema: SchemaHint::new(&["relevance_score"], "{\"relevance_score\":3}"),
        }
    }

    #[test]
    fn test_validate_accepts_sane_request() {
        assert!(request(8000, 0.3).validate(16_000).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(matches!(
            request(0, 0.3).validate(16_000),
            Err(CompletionError::InvalidRequest(_))
        ));
        assert!(matches!(
            request(20_000, 0.3).validate(16_000),
            Err(CompletionError::InvalidRequest(_))
        ));
        assert!(matches!(
            request(8000, 3.5).validate(16_000),
            Err(CompletionError::InvalidRequest(_))
        ));
    }
}
