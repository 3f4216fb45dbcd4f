//! Extraction and completeness classification of completion payloads.
//!
//! Models asked for "a single JSON object" still wrap it in markdown fences
//! or prose often enough that extraction has to tolerate both. A payload
//! that fails to parse is classified as truncated only when there is
//! positive evidence: the endpoint reported a length stop, or the document
//! is cut mid-structure.

use serde_json::Value;

use crate::error::CompletionError;
use crate::request::SchemaHint;

/// Pull a JSON document out of raw completion text: a ```json fence wins,
/// then the outermost brace window, then the trimmed text itself.
pub fn extract_json(text: &str) -> String {
    if let Some(fenced) = extract_from_markdown(text) {
        return fenced;
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return text[start..=end].to_string();
        }
    }
    text.trim().to_string()
}

fn extract_from_markdown(text: &str) -> Option<String> {
    let fence_start = text.find("```json")?;
    let remaining = text[fence_start + 7..].trim_start();
    let fence_end = remaining.find("```")?;
    let content = remaining[..fence_end].trim();
    if content.is_empty() {
        return None;
    }
    Some(content.to_string())
}

/// Whether the text looks like a JSON document cut off mid-stream:
/// unbalanced braces/brackets or an unterminated string literal.
pub fn looks_truncated(text: &str) -> bool {
    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut saw_open = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => {
                depth += 1;
                saw_open = true;
            }
            '}' | ']' => depth -= 1,
            _ => {}
        }
    }

    saw_open && (depth > 0 || in_string)
}

/// Parse a raw completion into the expected JSON object, distinguishing
/// truncation from plain schema violations.
pub fn parse_payload(
    raw: &str,
    finish_reason: Option<&str>,
    schema: &SchemaHint,
    max_output_tokens: u32,
) -> Result<Value, CompletionError> {
    let candidate = extract_json(raw);

    let value: Value = match serde_json::from_str(&candidate) {
        Ok(value) => value,
        Err(err) => {
            if finish_reason == Some("length") || looks_truncated(&candidate) {
                return Err(CompletionError::Truncated { max_output_tokens });
            }
            return Err(CompletionError::SchemaValidation(format!(
                "payload is not valid JSON: {err}"
            )));
        }
    };

    let object = value.as_object().ok_or_else(|| {
        CompletionError::SchemaValidation("payload is not a JSON object".to_string())
    })?;

    for key in schema.required_keys {
        if !object.contains_key(*key) {
            return Err(CompletionError::SchemaValidation(format!(
                "payload is missing required key `{key}`"
            )));
        }
    }

    Ok(value)
}
