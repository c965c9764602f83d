//! ReAct continuation: the serializable state of one run.
//!
//! A run can be suspended between two inbound messages while a side-effecting
//! tool call waits for a human. Instead of suspending a coroutine, everything
//! needed to pick the loop back up is kept here as plain data:
//!
//! ```text
//! ReactContinuation
//! ├── messages   ordered chat log (system, user, assistant, tool, ...)
//! ├── turn       LLM decision turns used so far
//! ├── trace      append-only tool trace
//! ├── pending    the one call waiting for approval
//! └── remaining  calls after `pending` in the same batch, not yet executed
//! ```
//!
//! The outer caller persists this (inside an `AgentSnapshot`) and hands it
//! back on the next message.
//!
//! Invariants enforced by the methods below:
//! - `remaining` is non-empty only while `pending` is set
//! - at most one `pending` exists at any time

use super::trace::{ToolTraceEntry, TraceStatus};
use crate::core::error::DomainError;
use crate::session::entities::ChatMessage;
use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// A tool call frozen at the approval gate.
///
/// The tool definition itself is not stored; it is resolved again by name
/// when the run resumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingToolCall {
    pub call: ToolCall,
    /// Arguments after map coercion.
    pub args: Map<String, Value>,
}

impl PendingToolCall {
    pub fn new(call: ToolCall, args: Map<String, Value>) -> Self {
        Self { call, args }
    }

    pub fn tool_name(&self) -> &str {
        &self.call.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactContinuation {
    messages: Vec<ChatMessage>,
    turn: usize,
    trace: Vec<ToolTraceEntry>,
    #[serde(default)]
    pending: Option<PendingToolCall>,
    #[serde(default)]
    remaining: VecDeque<ToolCall>,
}

impl ReactContinuation {
    /// Seed a fresh run: `[system, user(instruction)]`, turn 0, empty trace.
    pub fn start(system_prompt: &str, instruction: &str) -> Self {
        Self {
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(instruction),
            ],
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Number of tool-role messages in the log.
    pub fn tool_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_tool_result()).count()
    }

    pub fn trace(&self) -> &[ToolTraceEntry] {
        &self.trace
    }

    pub fn record(&mut self, entry: ToolTraceEntry) {
        self.trace.push(entry);
    }

    /// Settle the `waiting_for_approval` entry left by the gate.
    ///
    /// The last waiting entry for `entry.tool` is replaced in place so each
    /// attempted call keeps exactly one trace line. With no such entry the
    /// outcome is appended.
    pub fn settle(&mut self, entry: ToolTraceEntry) {
        let slot = self
            .trace
            .iter()
            .rposition(|e| e.status == TraceStatus::WaitingForApproval && e.tool == entry.tool);
        match slot {
            Some(i) => self.trace[i] = entry,
            None => self.trace.push(entry),
        }
    }

    /// Turns consumed so far.
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Consume one turn and return its zero-based index.
    pub fn advance_turn(&mut self) -> usize {
        let index = self.turn;
        self.turn += 1;
        index
    }

    pub fn pending(&self) -> Option<&PendingToolCall> {
        self.pending.as_ref()
    }

    pub fn remaining(&self) -> &VecDeque<ToolCall> {
        &self.remaining
    }

    pub fn is_paused(&self) -> bool {
        self.pending.is_some()
    }

    /// Freeze the run at the approval gate.
    ///
    /// Fails if another call is already pending.
    pub fn freeze(
        &mut self,
        pending: PendingToolCall,
        remaining: impl IntoIterator<Item = ToolCall>,
    ) -> Result<(), DomainError> {
        if let Some(existing) = &self.pending {
            return Err(DomainError::ApprovalAlreadyPending(
                existing.tool_name().to_string(),
            ));
        }
        self.pending = Some(pending);
        self.remaining = remaining.into_iter().collect();
        Ok(())
    }

    /// Take the pending call together with the rest of its batch, leaving the
    /// continuation un-paused.
    pub fn take_pending(&mut self) -> Option<(PendingToolCall, VecDeque<ToolCall>)> {
        let pending = self.pending.take()?;
        Some((pending, std::mem::take(&mut self.remaining)))
    }

    /// Drop the pending call and the rest of its batch without executing them.
    pub fn clear_pending(&mut self) -> Option<PendingToolCall> {
        self.remaining.clear();
        self.pending.take()
    }

    /// True when both invariants hold.
    pub fn invariants_hold(&self) -> bool {
        self.remaining.is_empty() || self.pending.is_some()
    }
}
