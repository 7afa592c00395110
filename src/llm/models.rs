//! Data models for chat-completion and bridge requests and responses

use serde::{Deserialize, Serialize};

/// Default deployment when neither config nor caller names one
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";

/// Default Azure OpenAI API version
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Message role in a chat completion
///
/// Every request is a single user turn, so no other role is sent.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A single message in the conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: Role,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Constrains the reply format
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    /// Ask the provider for syntactically valid JSON
    pub fn json_object() -> Self {
        Self { format_type: "json_object".to_string() }
    }
}

/// Request body for the chat completions endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Optional output constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatCompletionRequest {
    /// Create a single-prompt request with default settings
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: 4000,
            temperature: 0.7,
            response_format: None,
        }
    }

    /// Constrain the reply to a JSON object
    pub fn with_json_output(mut self, structured: bool) -> Self {
        self.response_format = structured.then(ResponseFormat::json_object);
        self
    }
}

/// Non-streaming response from the chat completions endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion choices; only the first is used
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Usage statistics
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content.as_deref())
    }
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Generated message
    pub message: ChoiceMessage,
    /// Why generation stopped
    pub finish_reason: Option<String>,
}

/// Message body inside a choice
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    /// Text content (null when the model refused or was filtered)
    pub content: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Request body for the serverless bridge (`POST /api/llm`)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub json_mode: bool,
}

/// Successful bridge response
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeResponse {
    #[serde(default)]
    pub content: String,
}
