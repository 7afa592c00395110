//! HTTP client for Azure OpenAI chat completions

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::error::LlmError;
use super::gateway::{ModelGateway, retry_after_seconds};
use super::models::{ChatCompletionRequest, ChatCompletionResponse, DEFAULT_DEPLOYMENT};

/// Direct client for an Azure-hosted OpenAI-compatible deployment
pub struct AzureOpenAiClient {
    /// HTTP client
    client: Client,
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    endpoint: String,
    /// API key for authentication
    api_key: String,
    /// Configured deployment; takes precedence over per-call hints
    deployment: Option<String>,
    /// API version query parameter
    api_version: String,
}

impl AzureOpenAiClient {
    /// Request timeout; long stories can take a while
    const TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a new client
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: Option<String>,
        api_version: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(Self::TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: deployment.filter(|d| !d.trim().is_empty()),
            api_version: api_version.into(),
        })
    }

    /// Pick the deployment: configured, then hint, then the default
    fn deployment_for<'a>(&'a self, model_hint: Option<&'a str>) -> &'a str {
        self.deployment
            .as_deref()
            .or(model_hint.filter(|h| !h.trim().is_empty()))
            .unwrap_or(DEFAULT_DEPLOYMENT)
    }

    /// Build the chat completions URL for a deployment
    fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            deployment,
            self.api_version
        )
    }
}

#[async_trait]
impl ModelGateway for AzureOpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        model_hint: Option<&str>,
        structured_output: bool,
    ) -> Result<String, LlmError> {
        let deployment = self.deployment_for(model_hint);
        let url = self.completions_url(deployment);
        let request = ChatCompletionRequest::new(prompt).with_json_output(structured_output);

        tracing::debug!(deployment, structured_output, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let retry_after = retry_after_seconds(response.headers());
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "Chat completion request failed");
            return Err(LlmError::from_status(status.as_u16(), &body, retry_after));
        }

        let body = response.text().await?;
        let completion: ChatCompletionResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion finished"
            );
        }

        match completion.first_content() {
            Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
            _ => Err(LlmError::upstream("no response content received")),
        }
    }

    fn name(&self) -> &'static str {
        "azure-openai"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::llm::gateway::testing::serve_once;

    fn client(deployment: Option<&str>) -> AzureOpenAiClient {
        AzureOpenAiClient::new(
            "https://example.openai.azure.com/",
            "test-key",
            deployment.map(str::to_string),
            "2024-02-15-preview",
        )
        .unwrap()
    }

    #[test]
    fn client_creation() {
        let client = client(None);
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.name(), "azure-openai");
    }

    #[test]
    fn completions_url_trims_trailing_slash() {
        let client = client(None);
        assert_eq!(
            client.completions_url("gpt-4o"),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn deployment_precedence() {
        assert_eq!(client(Some("story-model")).deployment_for(Some("hint")), "story-model");
        assert_eq!(client(None).deployment_for(Some("hint")), "hint");
        assert_eq!(client(None).deployment_for(None), DEFAULT_DEPLOYMENT);
        assert_eq!(client(Some("  ")).deployment_for(None), DEFAULT_DEPLOYMENT);
    }

    fn local(base_url: &str) -> AzureOpenAiClient {
        AzureOpenAiClient::new(base_url, "secret-key", None, "2024-02-15-preview").unwrap()
    }

    #[tokio::test]
    async fn generate_posts_chat_request_and_reads_first_choice() {
        let reply = json!({"choices": [{"message": {"role": "assistant", "content": "{\"title\":\"Т\"}"}}]});
        let (base_url, server) = serve_once("200 OK", reply.to_string()).await;

        let text = local(&base_url).generate("Напиши рассказ", Some("gpt-4o-mini"), true).await.unwrap();
        assert_eq!(text, "{\"title\":\"Т\"}");

        let request = server.await.unwrap();
        assert_eq!(
            request.line,
            "POST /openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-02-15-preview HTTP/1.1"
        );
        assert_eq!(request.header("api-key"), Some("secret-key"));
        assert_eq!(request.body["messages"], json!([{"role": "user", "content": "Напиши рассказ"}]));
        assert_eq!(request.body["max_tokens"], 4000);
        assert_eq!(request.body["response_format"], json!({"type": "json_object"}));
    }

    #[tokio::test]
    async fn throttling_carries_retry_after() {
        let (base_url, _server) =
            serve_once("429 Too Many Requests\r\nretry-after: 7\r\n", "{}").await;

        let err = local(&base_url).generate("hi", None, false).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { retry_after_seconds: Some(7) }));
    }

    #[tokio::test]
    async fn rejected_key_is_an_auth_error() {
        let body = json!({"error": {"code": "401", "message": "Access denied"}}).to_string();
        let (base_url, _server) = serve_once("401 Unauthorized", body).await;

        let err = local(&base_url).generate("hi", None, false).await.unwrap_err();
        assert!(err.requires_reauth());
    }

    #[tokio::test]
    async fn empty_content_is_upstream() {
        let reply = json!({"choices": [{"message": {"content": "  "}}]});
        let (base_url, _server) = serve_once("200 OK", reply.to_string()).await;

        let err = local(&base_url).generate("hi", None, false).await.unwrap_err();
        assert!(matches!(err, LlmError::Upstream { status: None, .. }));
    }
}
