//! LLM client port
//!
//! Defines the single call the ReAct loop makes against a language model:
//! one chat completion per decision turn.

use agentry_domain::{ChatMessage, LlmResponse, ToolChoice, ToolSchema};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during an LLM call
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Client for LLM chat completions.
///
/// Implementations (adapters) live in the infrastructure layer. The client is
/// shared by reference across every tool call of an agent instance and is
/// also handed to tool executors through `DomainToolContext`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one chat completion.
    ///
    /// `tools` is `None` when the agent has no tools; `tool_choice` is then
    /// ignored by well-behaved implementations.
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        tool_choice: ToolChoice,
    ) -> Result<LlmResponse, LlmError>;
}
