//! Approval replies and resumption.

use super::ReactController;
use super::dispatch::unknown_tool_message;
use crate::ports::approval_parser::ApprovalParser;
use agentry_domain::{AgentResult, ApprovalDecision, ToolTraceEntry, TraceStatus, cap_chars};
use serde_json::json;
use tracing::{info, warn};

/// Characters of a modify reply kept in the trace.
pub const MODIFY_SUMMARY_MAX_CHARS: usize = 180;

/// Error text when an approval arrives with no call waiting.
pub const NOTHING_TO_RESUME: &str = "Nothing to resume: no tool call is waiting for approval.";

impl ReactController {
    /// Handle the reply to an approval prompt.
    pub async fn on_waiting_for_approval(
        &mut self,
        reply: &str,
        parser: &dyn ApprovalParser,
    ) -> AgentResult {
        let decision = parser.classify(reply).await;
        let tool = self
            .state
            .as_ref()
            .and_then(|s| s.pending())
            .map(|p| p.tool_name().to_string());
        info!(decision = %decision, tool = ?tool, "Approval reply classified");
        self.emit(
            "approval_decision",
            json!({"decision": decision.as_str(), "tool": tool}),
        );

        match decision {
            ApprovalDecision::Approved => self.resume().await,
            ApprovalDecision::Rejected => self.close_pending(
                TraceStatus::Rejected,
                "Rejected by user",
                AgentResult::cancelled("Okay, I won't do that."),
            ),
            ApprovalDecision::Modify(text) => {
                let summary = cap_chars(&text, MODIFY_SUMMARY_MAX_CHARS);
                let result = AgentResult::cancelled(format!(
                    "Cancelled the pending action. You said: {}",
                    text
                ));
                self.close_pending(TraceStatus::Modified, &summary, result)
            }
        }
    }

    /// Execute the approved call, then continue the loop. Calls that followed
    /// it in the original batch run next, before any new LLM turn.
    pub async fn resume(&mut self) -> AgentResult {
        let Some(mut state) = self.state.take() else {
            warn!("Resume requested without an active run");
            return AgentResult::error(NOTHING_TO_RESUME).with_trace(&[]);
        };
        let Some((pending, remaining)) = state.take_pending() else {
            warn!("Resume requested without a pending tool call");
            return self.settle_run(state, AgentResult::error(NOTHING_TO_RESUME));
        };

        info!(tool = %pending.tool_name(), remaining = remaining.len(), "Resuming approved tool call");
        let (status, content) = match self.tools.get(pending.tool_name()) {
            Some(tool) => self.run_tool(tool, &pending.args).await,
            None => {
                warn!(tool = %pending.tool_name(), "Approved tool is no longer registered");
                (TraceStatus::Error, unknown_tool_message(pending.tool_name()))
            }
        };
        self.append_outcome(&mut state, &pending.call, status, content, true);

        let result = self.run_react(&mut state, remaining).await;
        self.settle_run(state, result)
    }

    fn close_pending(
        &mut self,
        status: TraceStatus,
        summary: &str,
        result: AgentResult,
    ) -> AgentResult {
        let Some(mut state) = self.state.take() else {
            return AgentResult::error(NOTHING_TO_RESUME).with_trace(&[]);
        };
        match state.clear_pending() {
            Some(pending) => {
                state.settle(ToolTraceEntry::new(pending.tool_name(), status, summary));
                self.settle_run(state, result)
            }
            None => self.settle_run(state, AgentResult::error(NOTHING_TO_RESUME)),
        }
    }
}
