//! Domain error types

use crate::agent::status::AgentStatus;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: AgentStatus, to: AgentStatus },

    #[error("A tool call is already pending approval: {0}")]
    ApprovalAlreadyPending(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },
}

impl DomainError {
    /// Check if this error came from the lifecycle transition table
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, DomainError::InvalidTransition { .. })
    }
}
