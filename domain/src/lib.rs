//! Domain layer for agentry
//!
//! This crate contains the vocabulary of tool-using conversational agents.
//! It has no dependencies on infrastructure or I/O.
//!
//! # Core Concepts
//!
//! ## Agent lifecycle
//!
//! Every agent instance reports an [`AgentStatus`] after each inbound message.
//! `COMPLETED`, `CANCELLED` and `ERROR` end a run; `WAITING_FOR_INPUT` and
//! `WAITING_FOR_APPROVAL` suspend it until the next message.
//!
//! ## ReAct continuation
//!
//! A domain agent runs a bounded reason-then-act loop against an LLM. When a
//! side-effecting tool needs human approval, the loop is frozen into a
//! [`ReactContinuation`] (plain, serializable data) and resumed on the next
//! message.

pub mod agent;
pub mod core;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use agent::{
    AgentId, AgentResult, AgentSnapshot, AgentStatus, ApprovalDecision, FieldSpec,
    FieldValidator, Lifecycle, PendingToolCall, ReactContinuation, ToolTraceEntry, TraceStatus,
};
pub use crate::core::{
    error::DomainError,
    string::{TRUNCATION_MARKER, cap_chars, truncate_with_marker},
};
pub use session::{AssistantToolCall, ChatMessage, LlmResponse, Role};
pub use tool::{ToolCall, ToolChoice, ToolError, ToolSchema};
