//! Agent status vocabulary and identifiers.

use serde::{Deserialize, Serialize};

/// Unique identifier for an agent instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new random AgentId.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for AgentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status reported by an agent after handling a message.
///
/// ```text
/// INITIALIZING ─▶ WAITING_FOR_INPUT ─▶ WAITING_FOR_APPROVAL ─▶ RUNNING ─▶ COMPLETED
///        │                │                    │   ▲   │           │
///        └────────────────┴────────────────────┼───┼───┘           └──▶ ERROR
///                                              ▼   │
///                                          CANCELLED
/// ```
///
/// `PAUSED` can be entered from any non-terminal status and returns to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Initializing,
    Running,
    WaitingForInput,
    WaitingForApproval,
    Paused,
    Completed,
    Error,
    Cancelled,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Initializing => "INITIALIZING",
            AgentStatus::Running => "RUNNING",
            AgentStatus::WaitingForInput => "WAITING_FOR_INPUT",
            AgentStatus::WaitingForApproval => "WAITING_FOR_APPROVAL",
            AgentStatus::Paused => "PAUSED",
            AgentStatus::Completed => "COMPLETED",
            AgentStatus::Error => "ERROR",
            AgentStatus::Cancelled => "CANCELLED",
        }
    }

    /// `COMPLETED`, `CANCELLED` and `ERROR` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentStatus::Completed | AgentStatus::Cancelled | AgentStatus::Error
        )
    }

    /// Statuses in which the agent is suspended until the next inbound message.
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            AgentStatus::WaitingForInput | AgentStatus::WaitingForApproval
        )
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_set() {
        let terminal: Vec<_> = [
            AgentStatus::Initializing,
            AgentStatus::Running,
            AgentStatus::WaitingForInput,
            AgentStatus::WaitingForApproval,
            AgentStatus::Paused,
            AgentStatus::Completed,
            AgentStatus::Error,
            AgentStatus::Cancelled,
        ]
        .into_iter()
        .filter(|s| s.is_terminal())
        .collect();

        assert_eq!(
            terminal,
            vec![
                AgentStatus::Completed,
                AgentStatus::Error,
                AgentStatus::Cancelled
            ]
        );
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&AgentStatus::WaitingForApproval).unwrap();
        assert_eq!(json, "\"WAITING_FOR_APPROVAL\"");
        let back: AgentStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, AgentStatus::Cancelled);
        assert_eq!(AgentStatus::WaitingForInput.to_string(), "WAITING_FOR_INPUT");
    }

    #[test]
    fn test_agent_id() {
        let id = AgentId::new("agent-1");
        assert_eq!(id.as_str(), "agent-1");
        assert_eq!(id.to_string(), "agent-1");
        assert_ne!(AgentId::generate(), AgentId::generate());
    }
}
