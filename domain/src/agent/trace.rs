//! Tool trace: the append-only audit log of one run.

use crate::core::string::cap_chars;
use serde::{Deserialize, Serialize};

/// Maximum characters kept in a [`ToolTraceEntry::summary`].
pub const TRACE_SUMMARY_MAX_CHARS: usize = 240;

/// Outcome recorded for a single tool invocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    Ok,
    Error,
    WaitingForApproval,
    Rejected,
    Modified,
}

impl TraceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceStatus::Ok => "ok",
            TraceStatus::Error => "error",
            TraceStatus::WaitingForApproval => "waiting_for_approval",
            TraceStatus::Rejected => "rejected",
            TraceStatus::Modified => "modified",
        }
    }
}

impl std::fmt::Display for TraceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolTraceEntry {
    pub tool: String,
    pub status: TraceStatus,
    pub summary: String,
}

impl ToolTraceEntry {
    /// Build an entry; `summary` is capped at [`TRACE_SUMMARY_MAX_CHARS`].
    pub fn new(tool: impl Into<String>, status: TraceStatus, summary: &str) -> Self {
        Self {
            tool: tool.into(),
            status,
            summary: cap_chars(summary, TRACE_SUMMARY_MAX_CHARS),
        }
    }
}
