//! Persistable form of an agent instance.

use super::continuation::ReactContinuation;
use super::lifecycle::Lifecycle;
use super::status::{AgentId, AgentStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything the outer caller must keep between two inbound messages to
/// rebuild an agent instance: which agent type it is, where it stands in its
/// lifecycle, what it has collected, the instruction it is working on, and
/// the ReAct continuation if a run is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_type: String,
    pub agent_id: AgentId,
    pub lifecycle: Lifecycle,
    #[serde(default)]
    pub collected: Map<String, Value>,
    /// The message that started the current run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation: Option<ReactContinuation>,
}

impl AgentSnapshot {
    pub fn status(&self) -> AgentStatus {
        self.lifecycle.status()
    }
}
