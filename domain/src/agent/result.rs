//! AgentResult — what an agent hands back to its caller after every message.

use super::status::{AgentId, AgentStatus};
use super::trace::ToolTraceEntry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key carrying the serialized tool trace.
pub const META_TOOL_TRACE: &str = "toolTrace";
/// Metadata key carrying the number of trace entries.
pub const META_TOOL_CALLS_COUNT: &str = "toolCallsCount";

/// Outcome of handling one inbound message.
///
/// Serializes with camelCase keys (`rawMessage`, `missingFields`, ...) since
/// this is the surface consumed by the outer router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub status: AgentStatus,
    pub raw_message: String,
    /// Collected input fields.
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
}

impl AgentResult {
    pub fn new(status: AgentStatus, raw_message: impl Into<String>) -> Self {
        Self {
            agent_id: None,
            status,
            raw_message: raw_message.into(),
            data: Map::new(),
            metadata: Map::new(),
            missing_fields: None,
        }
    }

    pub fn completed(raw_message: impl Into<String>) -> Self {
        Self::new(AgentStatus::Completed, raw_message)
    }

    pub fn error(raw_message: impl Into<String>) -> Self {
        Self::new(AgentStatus::Error, raw_message)
    }

    pub fn cancelled(raw_message: impl Into<String>) -> Self {
        Self::new(AgentStatus::Cancelled, raw_message)
    }

    pub fn waiting_for_approval(preview: impl Into<String>) -> Self {
        Self::new(AgentStatus::WaitingForApproval, preview)
    }

    pub fn waiting_for_input(prompt: impl Into<String>, missing: Vec<String>) -> Self {
        let mut result = Self::new(AgentStatus::WaitingForInput, prompt);
        result.missing_fields = Some(missing);
        result
    }

    pub fn with_agent_id(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Attach the tool trace and its length under `toolTrace` / `toolCallsCount`.
    pub fn with_trace(mut self, trace: &[ToolTraceEntry]) -> Self {
        let entries = serde_json::to_value(trace).unwrap_or(Value::Array(Vec::new()));
        self.metadata.insert(META_TOOL_TRACE.to_string(), entries);
        self.metadata
            .insert(META_TOOL_CALLS_COUNT.to_string(), Value::from(trace.len()));
        self
    }

    /// Read the attached trace back; empty when none was attached.
    pub fn tool_trace(&self) -> Vec<ToolTraceEntry> {
        self.metadata
            .get(META_TOOL_TRACE)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn tool_calls_count(&self) -> usize {
        self.metadata
            .get(META_TOOL_CALLS_COUNT)
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
