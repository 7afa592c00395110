//! Client for the serverless LLM bridge
//!
//! Used when the credential lives on a server instead of on this machine.
//! The bridge forwards `{prompt, modelName, jsonMode}` to the provider and
//! answers `{content}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::error::LlmError;
use super::gateway::{ModelGateway, retry_after_seconds};
use super::models::{BridgeRequest, BridgeResponse};

/// Gateway that posts prompts to `{base_url}/api/llm`
pub struct BridgeClient {
    client: Client,
    base_url: String,
}

impl BridgeClient {
    const TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a new bridge client
    pub fn new(base_url: impl Into<String>) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(Self::TIMEOUT).build()?;
        Ok(Self { client, base_url: base_url.into() })
    }

    fn url(&self) -> String {
        format!("{}/api/llm", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelGateway for BridgeClient {
    async fn generate(
        &self,
        prompt: &str,
        model_hint: Option<&str>,
        structured_output: bool,
    ) -> Result<String, LlmError> {
        let request = BridgeRequest {
            prompt: prompt.to_string(),
            model_name: model_hint.map(str::to_string),
            json_mode: structured_output,
        };

        let response = self.client.post(self.url()).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = retry_after_seconds(response.headers());
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "Bridge request failed");
            return Err(LlmError::from_status(status.as_u16(), &body, retry_after));
        }

        let body = response.text().await?;
        let reply: BridgeResponse = serde_json::from_str(&body)?;

        if reply.content.trim().is_empty() {
            return Err(LlmError::upstream("bridge returned empty content"));
        }
        Ok(reply.content)
    }

    fn name(&self) -> &'static str {
        "bridge"
    }
}
