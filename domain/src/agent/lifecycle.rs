//! Agent lifecycle — the transition table every agent instance obeys.
//!
//! | From | Allowed targets |
//! |------|-----------------|
//! | `INITIALIZING` | `WAITING_FOR_INPUT`, `WAITING_FOR_APPROVAL`, `RUNNING` |
//! | `WAITING_FOR_INPUT` | `WAITING_FOR_INPUT`, `WAITING_FOR_APPROVAL`, `RUNNING` |
//! | `WAITING_FOR_APPROVAL` | `RUNNING`, `WAITING_FOR_APPROVAL`, `COMPLETED` |
//! | `RUNNING` | `WAITING_FOR_APPROVAL`, `COMPLETED` |
//! | terminal | `INITIALIZING` (a fresh instruction starts a new run) |
//!
//! On top of that, every non-terminal status may move to `CANCELLED`,
//! `ERROR` or `PAUSED`, and `PAUSED` only returns to the status it was
//! entered from (or is cancelled).
//!
//! `WAITING_FOR_APPROVAL -> COMPLETED` covers a resumed run that finishes
//! inside the same message as the approval.

use super::status::AgentStatus;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Whether `from -> to` is a legal step, ignoring pause bookkeeping.
pub fn can_transition(from: AgentStatus, to: AgentStatus) -> bool {
    use AgentStatus::*;

    if from.is_terminal() {
        return to == Initializing;
    }
    if from == Paused {
        return to == Cancelled;
    }
    if matches!(to, Cancelled | Error | Paused) {
        return true;
    }
    matches!(
        (from, to),
        (Initializing, WaitingForInput)
            | (Initializing, WaitingForApproval)
            | (Initializing, Running)
            | (WaitingForInput, WaitingForInput)
            | (WaitingForInput, WaitingForApproval)
            | (WaitingForInput, Running)
            | (WaitingForApproval, Running)
            | (WaitingForApproval, WaitingForApproval)
            | (WaitingForApproval, Completed)
            | (Running, WaitingForApproval)
            | (Running, Completed)
    )
}

/// Current status plus the status a pause will return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paused_from: Option<AgentStatus>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            status: AgentStatus::Initializing,
            paused_from: None,
        }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn paused_from(&self) -> Option<AgentStatus> {
        self.paused_from
    }

    /// Move to `to`, rejecting steps outside the table.
    pub fn transition_to(&mut self, to: AgentStatus) -> Result<(), DomainError> {
        if !can_transition(self.status, to) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        if to == AgentStatus::Paused {
            self.paused_from = Some(self.status);
        } else {
            self.paused_from = None;
        }
        self.status = to;
        Ok(())
    }

    /// Pause from any non-terminal, non-paused status.
    pub fn pause(&mut self) -> Result<(), DomainError> {
        self.transition_to(AgentStatus::Paused)
    }

    /// Return to the status the agent was paused from.
    pub fn unpause(&mut self) -> Result<AgentStatus, DomainError> {
        match (self.status, self.paused_from) {
            (AgentStatus::Paused, Some(previous)) => {
                self.status = previous;
                self.paused_from = None;
                Ok(previous)
            }
            (from, _) => Err(DomainError::InvalidTransition {
                from,
                to: AgentStatus::Running,
            }),
        }
    }

    /// Start over after a terminal status.
    pub fn restart(&mut self) -> Result<(), DomainError> {
        self.transition_to(AgentStatus::Initializing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AgentStatus::*;

    #[test]
    fn test_happy_path() {
        let mut lc = Lifecycle::new();
        lc.transition_to(WaitingForInput).unwrap();
        lc.transition_to(WaitingForApproval).unwrap();
        lc.transition_to(Running).unwrap();
        lc.transition_to(Completed).unwrap();
        assert_eq!(lc.status(), Completed);
    }

    #[test]
    fn test_tool_approval_round_trip() {
        let mut lc = Lifecycle::new();
        lc.transition_to(Running).unwrap();
        lc.transition_to(WaitingForApproval).unwrap();
        lc.transition_to(Running).unwrap();
        lc.transition_to(WaitingForApproval).unwrap();
        lc.transition_to(Completed).unwrap();
    }

    #[test]
    fn test_terminal_only_restarts() {
        for terminal in [Completed, Error, Cancelled] {
            assert!(!can_transition(terminal, Running));
            assert!(!can_transition(terminal, Paused));
            assert!(can_transition(terminal, Initializing));
        }
    }

    #[test]
    fn test_running_cannot_go_back_to_input() {
        let mut lc = Lifecycle::new();
        lc.transition_to(Running).unwrap();
        let err = lc.transition_to(Initializing).unwrap_err();
        assert!(err.is_invalid_transition());
        assert_eq!(lc.status(), Running);
    }

    #[test]
    fn test_pause_remembers_previous_status() {
        let mut lc = Lifecycle::new();
        lc.transition_to(WaitingForApproval).unwrap();
        lc.pause().unwrap();
        assert_eq!(lc.status(), Paused);
        assert_eq!(lc.paused_from(), Some(WaitingForApproval));

        assert!(lc.transition_to(Running).is_err());
        assert_eq!(lc.unpause().unwrap(), WaitingForApproval);
        assert_eq!(lc.paused_from(), None);
    }

    #[test]
    fn test_unpause_when_not_paused_fails() {
        let mut lc = Lifecycle::new();
        assert!(lc.unpause().is_err());
    }

    #[test]
    fn test_paused_can_be_cancelled() {
        let mut lc = Lifecycle::new();
        lc.transition_to(Running).unwrap();
        lc.pause().unwrap();
        lc.transition_to(Cancelled).unwrap();
        assert!(lc.status().is_terminal());
        lc.restart().unwrap();
        assert_eq!(lc.status(), Initializing);
    }
}
