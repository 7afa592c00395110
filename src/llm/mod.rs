//! LLM integration module
//!
//! Provides the [`ModelGateway`] seam, its two transports (direct Azure OpenAI
//! and the serverless bridge), and API key management.

pub mod auth;
pub mod bridge;
pub mod client;
pub mod error;
pub mod gateway;
pub mod models;

// Re-export commonly used types
pub use auth::{ApiKeyManager, CredentialError};
pub use bridge::BridgeClient;
pub use client::AzureOpenAiClient;
pub use error::LlmError;
pub use gateway::ModelGateway;
