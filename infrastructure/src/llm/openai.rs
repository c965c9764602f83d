//! OpenAI-compatible chat completions client.
//!
//! Works against any endpoint that speaks the `/chat/completions` dialect
//! with function tools (OpenAI, Azure OpenAI, Ollama, vLLM, ...).
//!
//! Request and response mapping are plain functions so they can be tested
//! without a server.

use crate::config::FileLlmConfig;
use agentry_application::{LlmClient, LlmError};
use agentry_domain::{ChatMessage, LlmResponse, ToolCall, ToolChoice, ToolSchema};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub model: String,
    pub base_url: String,
    api_key: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Build from the `[llm]` section, reading the key from `api_key_env`.
    pub fn from_file_config(config: &FileLlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| LlmError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self::new(&config.model, api_key)
            .with_base_url(&config.base_url)
            .with_timeout(Duration::from_secs(config.request_timeout_seconds)))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct OpenAiCompatibleClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        tool_choice: ToolChoice,
    ) -> Result<LlmResponse, LlmError> {
        let body = build_request(&self.config.model, messages, tools, tool_choice);
        debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.map_or(0, <[ToolSchema]>::len),
            "Sending chat completion"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else if e.is_connect() {
                    LlmError::ConnectionError(e.to_string())
                } else {
                    LlmError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        if !status.is_success() {
            return Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, text)));
        }
        parse_response(&text)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

fn build_request<'a>(
    model: &'a str,
    messages: &'a [ChatMessage],
    tools: Option<&[ToolSchema]>,
    tool_choice: ToolChoice,
) -> ChatRequest<'a> {
    let tools = tools
        .filter(|t| !t.is_empty())
        .map(|t| t.iter().map(ToolSchema::to_api_json).collect::<Vec<_>>());
    let tool_choice = tools.as_ref().map(|_| tool_choice.as_str());
    ChatRequest {
        model,
        messages,
        tools,
        tool_choice,
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

fn parse_response(body: &str) -> Result<LlmResponse, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| {
            let arguments = parse_arguments(tc.function.arguments.as_deref().unwrap_or_default());
            ToolCall::new(tc.id, tc.function.name, arguments)
        })
        .collect();
    Ok(LlmResponse {
        content: choice.message.content,
        tool_calls,
    })
}

/// The API sends arguments as a JSON string. Anything unparseable is kept as
/// a string value and later treated as empty arguments.
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
