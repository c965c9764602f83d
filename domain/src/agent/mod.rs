//! Agent domain module
//!
//! Vocabulary shared by every agent type:
//!
//! - [`status`] — `AgentStatus` and `AgentId`
//! - [`result`] — `AgentResult`, the per-message outcome
//! - [`trace`] — `ToolTraceEntry`, the append-only tool audit log
//! - [`lifecycle`] — transition table and pause bookkeeping
//! - [`fields`] — declarative input fields and their validators
//! - [`approval`] — classified replies to approval prompts
//! - [`continuation`] — the serializable ReAct pause/resume state
//! - [`snapshot`] — the persistable form of a whole agent instance

pub mod approval;
pub mod continuation;
pub mod fields;
pub mod lifecycle;
pub mod result;
pub mod snapshot;
pub mod status;
pub mod trace;

pub use approval::ApprovalDecision;
pub use continuation::{PendingToolCall, ReactContinuation};
pub use fields::{FieldSpec, FieldValidator};
pub use lifecycle::Lifecycle;
pub use result::AgentResult;
pub use snapshot::AgentSnapshot;
pub use status::{AgentId, AgentStatus};
pub use trace::{ToolTraceEntry, TraceStatus};
