//! Approval decisions produced by classifying a free-text reply.

use serde::{Deserialize, Serialize};

/// Classification of a reply to an approval prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "text", rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
    /// Anything that is neither a clear yes nor a clear no; carries the raw reply.
    Modify(String),
}

impl ApprovalDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalDecision::Approved => "approved",
            ApprovalDecision::Rejected => "rejected",
            ApprovalDecision::Modify(_) => "modify",
        }
    }
}

impl std::fmt::Display for ApprovalDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
