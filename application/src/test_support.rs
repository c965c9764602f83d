//! Shared test doubles: a scripted LLM client and configurable tool handlers.

use crate::ports::llm_client::{LlmClient, LlmError};
use crate::ports::tool_handler::ToolHandler;
use crate::tools::context::DomainToolContext;
use agentry_domain::{ChatMessage, LlmResponse, ToolCall, ToolChoice, ToolError, ToolSchema};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded `chat_completion` call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_names: Option<Vec<String>>,
    pub tool_choice: ToolChoice,
}

/// LLM client that replays scripted responses in order.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<LlmResponse, String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<LlmResponse>) -> Arc<Self> {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(responses: Vec<Result<LlmResponse, String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queue more responses (used between the two halves of a pause/resume test).
    pub fn push(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        tool_choice: ToolChoice,
    ) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.map(|t| t.iter().map(|s| s.name.clone()).collect()),
            tool_choice,
        });
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(e)) => Err(LlmError::RequestFailed(e)),
            None => Ok(LlmResponse::from_text("(no more responses)")),
        }
    }
}

enum Behavior {
    Ok(String),
    Fail(String),
    Sleep(Duration),
    Panic(String),
}

enum PreviewBehavior {
    None,
    Fail,
    Text(String),
}

/// Tool handler with canned behaviour that records every invocation.
pub struct FnTool {
    behavior: Behavior,
    preview: PreviewBehavior,
    calls: Arc<Mutex<Vec<Map<String, Value>>>>,
}

impl FnTool {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            preview: PreviewBehavior::None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ok(output: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Ok(output.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    pub fn sleeping(duration: Duration) -> Self {
        Self::with_behavior(Behavior::Sleep(duration))
    }

    pub fn panicking(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Panic(message.into()))
    }

    pub fn with_preview(mut self, text: impl Into<String>) -> Self {
        self.preview = PreviewBehavior::Text(text.into());
        self
    }

    pub fn with_failing_preview(mut self) -> Self {
        self.preview = PreviewBehavior::Fail;
        self
    }

    /// Handle onto the invocation log; clone it before the tool is moved.
    pub fn calls(&self) -> Arc<Mutex<Vec<Map<String, Value>>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ToolHandler for FnTool {
    async fn execute(
        &self,
        args: &Map<String, Value>,
        _ctx: &DomainToolContext,
    ) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(args.clone());
        match &self.behavior {
            Behavior::Ok(out) => Ok(out.clone()),
            Behavior::Fail(msg) => Err(ToolError::execution_failed(msg.clone())),
            Behavior::Sleep(d) => {
                tokio::time::sleep(*d).await;
                Ok("slept".to_string())
            }
            Behavior::Panic(msg) => panic!("{}", msg),
        }
    }

    async fn preview(
        &self,
        _args: &Map<String, Value>,
        _ctx: &DomainToolContext,
    ) -> Option<Result<String, ToolError>> {
        match &self.preview {
            PreviewBehavior::None => None,
            PreviewBehavior::Fail => Some(Err(ToolError::execution_failed("preview broke"))),
            PreviewBehavior::Text(t) => Some(Ok(t.clone())),
        }
    }
}

pub fn context_with(llm: Arc<ScriptedLlm>) -> DomainToolContext {
    DomainToolContext::new(llm, "tenant-1")
}

pub fn call(id: &str, name: &str, args: Value) -> ToolCall {
    ToolCall::new(id, name, args)
}

pub fn tool_turn(calls: Vec<ToolCall>) -> LlmResponse {
    LlmResponse::with_tool_calls(calls)
}
