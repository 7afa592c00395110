//! Error types for LLM gateway calls

use thiserror::Error;

/// Errors that can occur when asking the model for a completion
#[derive(Debug, Error)]
pub enum LlmError {
    /// Credential missing or rejected by the provider
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Unknown model, deployment or endpoint path
    #[error("Model or deployment not found: {0}")]
    NotFound(String),

    /// Provider throttling
    #[error("Rate limit exceeded{}", retry_hint(.retry_after_seconds))]
    RateLimited {
        /// Seconds the provider asked us to wait, if it said
        retry_after_seconds: Option<u64>,
    },

    /// Any other non-2xx status, transport failure or malformed envelope
    #[error("Upstream error{}: {message}", status_hint(.status))]
    Upstream {
        /// HTTP status code, absent for transport failures
        status: Option<u16>,
        /// Error message from the provider or transport
        message: String,
    },
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(". Retry after {} seconds", secs),
        None => " - please try again later".to_string(),
    }
}

fn status_hint(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl LlmError {
    /// Build an upstream error without a status code
    pub fn upstream(message: impl Into<String>) -> Self {
        LlmError::Upstream { status: None, message: message.into() }
    }

    /// Map a non-success HTTP status to the gateway taxonomy
    pub fn from_status(status: u16, body: &str, retry_after_seconds: Option<u64>) -> Self {
        match status {
            401 | 403 => LlmError::Auth("please check your API key".to_string()),
            404 => LlmError::NotFound(
                "the resource or deployment does not exist".to_string(),
            ),
            429 => LlmError::RateLimited { retry_after_seconds },
            _ => LlmError::Upstream { status: Some(status), message: summarize_body(body) },
        }
    }

    /// Check if this error is recoverable (user can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. } | LlmError::Upstream { .. })
    }

    /// Check if this error requires re-authentication
    pub fn requires_reauth(&self) -> bool {
        matches!(self, LlmError::Auth(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Upstream { status: err.status().map(|s| s.as_u16()), message: err.to_string() }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::upstream(format!("malformed response body: {}", err))
    }
}

/// Pull a readable message out of an error body
///
/// Providers usually answer `{"error": {"message": ...}}` or
/// `{"error": ..., "message": ...}`; anything else is passed through trimmed.
fn summarize_body(body: &str) -> String {
    let body = body.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = value["error"]["message"].as_str() {
            return msg.to_string();
        }
        if let Some(msg) = value["message"].as_str() {
            return msg.to_string();
        }
        if let Some(msg) = value["error"].as_str() {
            return msg.to_string();
        }
    }
    if body.is_empty() { "request failed".to_string() } else { body.to_string() }
}
