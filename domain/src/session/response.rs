//! LLM response for one ReAct decision turn.

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// What the LLM decided on a turn: either a natural-language answer
/// (`content`, no tool calls) or a batch of tool calls to execute in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// Text-only final answer.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// `content` or the empty string.
    pub fn text_content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}
