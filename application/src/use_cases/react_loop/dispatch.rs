//! Tool batch execution.

use super::ReactController;
use crate::tools::domain_tool::DomainTool;
use agentry_domain::{
    AgentResult, ChatMessage, PendingToolCall, ReactContinuation, ToolCall, ToolTraceEntry,
    TraceStatus, truncate_with_marker,
};
use serde_json::{Map, Value, json};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

pub(super) enum DispatchOutcome {
    /// Every call in the batch ran; the loop moves on to the next turn.
    Continue,
    /// A call hit the approval gate; the run is frozen.
    Paused(AgentResult),
}

pub(super) fn unknown_tool_message(name: &str) -> String {
    format!("Error: Unknown tool '{}'", name)
}

/// Non-object arguments become `{}`.
pub(super) fn coerce_args(call: &ToolCall) -> Map<String, Value> {
    if call.has_malformed_arguments() {
        warn!(
            tool = %call.name,
            arguments = %call.arguments,
            "Tool arguments are not an object, treating as empty"
        );
    }
    call.args_map()
}

impl ReactController {
    /// Run `calls` strictly in order until the batch ends or one needs approval.
    pub(super) async fn dispatch(
        &self,
        state: &mut ReactContinuation,
        mut calls: VecDeque<ToolCall>,
    ) -> DispatchOutcome {
        while let Some(call) = calls.pop_front() {
            let Some(tool) = self.tools.get(&call.name) else {
                warn!(tool = %call.name, "LLM requested an unknown tool");
                let message = unknown_tool_message(&call.name);
                self.append_outcome(state, &call, TraceStatus::Error, message, false);
                continue;
            };

            let args = coerce_args(&call);

            if tool.needs_approval {
                let preview = tool.render_preview(&args, &self.context).await;
                let name = call.name.clone();
                if let Err(e) = state.freeze(PendingToolCall::new(call, args), calls) {
                    warn!(tool = %name, error = %e, "Could not freeze run at approval gate");
                    return DispatchOutcome::Paused(AgentResult::error(e.to_string()));
                }
                state.record(ToolTraceEntry::new(
                    &name,
                    TraceStatus::WaitingForApproval,
                    &preview,
                ));
                info!(tool = %name, remaining = state.remaining().len(), "Waiting for approval");
                self.emit(
                    "approval_requested",
                    json!({"tool": name, "preview": preview}),
                );
                return DispatchOutcome::Paused(AgentResult::waiting_for_approval(preview));
            }

            let (status, content) = self.run_tool(tool, &args).await;
            self.append_outcome(state, &call, status, content, false);
        }
        DispatchOutcome::Continue
    }

    /// Execute with timeout and panic guard; failures become text.
    pub(super) async fn run_tool(
        &self,
        tool: &DomainTool,
        args: &Map<String, Value>,
    ) -> (TraceStatus, String) {
        let limit = self.params.max_tool_result_chars;
        match tool.run(args, &self.context, self.params.tool_timeout).await {
            Ok(output) => {
                debug!(tool = %tool.name, chars = output.chars().count(), "Tool succeeded");
                (TraceStatus::Ok, truncate_with_marker(&output, limit))
            }
            Err(e) => {
                warn!(tool = %tool.name, error = %e, "Tool execution failed");
                let message = format!("Error executing {}: {}", tool.name, e);
                (TraceStatus::Error, truncate_with_marker(&message, limit))
            }
        }
    }

    /// Trace entry plus tool-role message for one call. `settle` replaces the
    /// entry the approval gate left behind.
    pub(super) fn append_outcome(
        &self,
        state: &mut ReactContinuation,
        call: &ToolCall,
        status: TraceStatus,
        content: String,
        settle: bool,
    ) {
        let entry = ToolTraceEntry::new(&call.name, status, &content);
        if settle {
            state.settle(entry);
        } else {
            state.record(entry);
        }
        self.emit(
            "tool_result",
            json!({
                "tool": call.name,
                "call_id": call.id,
                "status": status.as_str(),
                "chars": content.chars().count(),
            }),
        );
        state.push_message(ChatMessage::tool_result(&call.id, content));
    }
}
