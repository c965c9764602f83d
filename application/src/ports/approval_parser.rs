//! Approval parser port.
//!
//! Classifies a free-text reply to an approval prompt into
//! [`ApprovalDecision`]. Classification is infallible from the caller's point
//! of view: an implementation that cannot decide returns
//! `ApprovalDecision::Modify(reply)`.
//!
//! # Built-in Implementations
//!
//! - [`AutoApproveParser`] - Always returns `Approved`
//! - [`AutoRejectParser`] - Always returns `Rejected`
//!
//! The keyword-based parser used interactively lives in the infrastructure
//! layer.

use agentry_domain::ApprovalDecision;
use async_trait::async_trait;

#[async_trait]
pub trait ApprovalParser: Send + Sync {
    async fn classify(&self, reply: &str) -> ApprovalDecision;
}

/// Approves every reply. Only useful for unattended runs and tests.
pub struct AutoApproveParser;

#[async_trait]
impl ApprovalParser for AutoApproveParser {
    async fn classify(&self, _reply: &str) -> ApprovalDecision {
        ApprovalDecision::Approved
    }
}

/// Rejects every reply; the safest non-interactive mode.
pub struct AutoRejectParser;

#[async_trait]
impl ApprovalParser for AutoRejectParser {
    async fn classify(&self, _reply: &str) -> ApprovalDecision {
        ApprovalDecision::Rejected
    }
}
