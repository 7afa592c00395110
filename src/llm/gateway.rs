//! The model gateway seam
//!
//! Everything that needs a completion goes through [`ModelGateway`], so the
//! tutor never knows which transport is configured.

use async_trait::async_trait;

use super::error::LlmError;

/// Sends one prompt to a model and returns its raw text reply
///
/// Implementations make a single attempt: no retries, no caching, no local
/// rate limiting. When `structured_output` is set the provider is asked for
/// syntactically valid JSON, but the shape of that JSON is not checked here.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Generate a reply for `prompt`
    async fn generate(
        &self,
        prompt: &str,
        model_hint: Option<&str>,
        structured_output: bool,
    ) -> Result<String, LlmError>;

    /// Short transport name for logs and status output
    fn name(&self) -> &'static str;
}

/// Parse a `retry-after` header given in whole seconds
pub(crate) fn retry_after_seconds(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}
