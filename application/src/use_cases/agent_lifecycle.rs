//! Agent lifecycle driver
//!
//! [`AgentInstance`] owns one agent's lifecycle and routes every inbound
//! message according to the current [`AgentStatus`]:
//!
//! | Status | Message is treated as |
//! |--------|-----------------------|
//! | `INITIALIZING` | the instruction |
//! | `WAITING_FOR_INPUT` | the value of the first missing required field |
//! | `WAITING_FOR_APPROVAL` | a reply to the pending approval prompt |
//! | `RUNNING` | forwarded to the handler |
//! | `PAUSED` | ignored until unpaused |
//! | terminal | a fresh instruction starting a new run |
//!
//! The agent-specific behaviour sits behind [`AgentHandler`].

use crate::ports::approval_parser::ApprovalParser;
use agentry_domain::agent::fields::{apply_modifications, collect_field, missing_fields};
use agentry_domain::{
    AgentId, AgentResult, AgentSnapshot, AgentStatus, ApprovalDecision, DomainError, FieldSpec,
    Lifecycle, ReactContinuation, ToolTraceEntry, TraceStatus,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Trace summary for a gated call dropped by [`AgentInstance::cancel`].
pub const CANCELLED_AT_GATE: &str = "Cancelled while waiting for approval";

/// Agent-specific half of an agent instance.
#[async_trait]
pub trait AgentHandler: Send + Sync {
    /// Fields collected before the agent runs.
    fn input_fields(&self) -> &[FieldSpec] {
        &[]
    }

    /// Whether the whole task is confirmed with the user before running.
    fn needs_approval(&self) -> bool {
        false
    }

    fn approval_prompt(&self, collected: &Map<String, Value>) -> String {
        let details: Vec<String> = collected
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("- {}: {}", k, s),
                other => format!("- {}: {}", k, other),
            })
            .collect();
        if details.is_empty() {
            "Shall I go ahead?".to_string()
        } else {
            format!("Shall I go ahead with:\n{}", details.join("\n"))
        }
    }

    /// Do the work. Called on entering `RUNNING` and for every message
    /// delivered while running.
    async fn on_running(&mut self, instruction: &str, collected: &Map<String, Value>)
    -> AgentResult;

    /// Reply to a handler-level approval prompt (a tool call at the gate).
    async fn on_waiting_for_approval(
        &mut self,
        _reply: &str,
        _parser: &dyn ApprovalParser,
    ) -> AgentResult {
        AgentResult::error("This agent has nothing waiting for approval.")
    }

    /// True while the handler itself, not the lifecycle, owns the approval.
    fn has_pending_approval(&self) -> bool {
        false
    }

    fn export_continuation(&self) -> Option<ReactContinuation> {
        None
    }

    fn restore_continuation(&mut self, _continuation: ReactContinuation) {}

    /// Drop any in-flight run state.
    fn reset(&mut self) {}
}

pub struct AgentInstance {
    agent_type: String,
    agent_id: AgentId,
    lifecycle: Lifecycle,
    collected: Map<String, Value>,
    instruction: Option<String>,
    handler: Box<dyn AgentHandler>,
    approval_parser: Arc<dyn ApprovalParser>,
}

impl AgentInstance {
    pub fn new(
        agent_type: impl Into<String>,
        handler: Box<dyn AgentHandler>,
        approval_parser: Arc<dyn ApprovalParser>,
    ) -> Self {
        Self {
            agent_type: agent_type.into(),
            agent_id: AgentId::generate(),
            lifecycle: Lifecycle::new(),
            collected: Map::new(),
            instruction: None,
            handler,
            approval_parser,
        }
    }

    /// Rebuild from a snapshot with a freshly built handler.
    pub fn from_snapshot(
        snapshot: AgentSnapshot,
        mut handler: Box<dyn AgentHandler>,
        approval_parser: Arc<dyn ApprovalParser>,
    ) -> Self {
        if let Some(continuation) = snapshot.continuation {
            handler.restore_continuation(continuation);
        }
        Self {
            agent_type: snapshot.agent_type,
            agent_id: snapshot.agent_id,
            lifecycle: snapshot.lifecycle,
            collected: snapshot.collected,
            instruction: snapshot.instruction,
            handler,
            approval_parser,
        }
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            agent_type: self.agent_type.clone(),
            agent_id: self.agent_id.clone(),
            lifecycle: self.lifecycle,
            collected: self.collected.clone(),
            instruction: self.instruction.clone(),
            continuation: self.handler.export_continuation(),
        }
    }

    pub fn agent_type(&self) -> &str {
        &self.agent_type
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    pub fn status(&self) -> AgentStatus {
        self.lifecycle.status()
    }

    pub fn collected(&self) -> &Map<String, Value> {
        &self.collected
    }

    /// Route one inbound message and report the outcome.
    pub async fn handle_message(&mut self, message: &str) -> AgentResult {
        let status = self.lifecycle.status();
        debug!(agent_id = %self.agent_id, status = %status, "Handling message");

        let result = match status {
            AgentStatus::Paused => {
                return self.decorate(AgentResult::new(
                    AgentStatus::Paused,
                    "This agent is paused. Unpause it to continue.",
                ));
            }
            s if s.is_terminal() => {
                info!(agent_id = %self.agent_id, previous = %s, "Fresh instruction, starting a new run");
                if let Err(e) = self.start_over() {
                    return self.decorate(AgentResult::error(e.to_string()));
                }
                self.begin(message).await
            }
            AgentStatus::Initializing => self.begin(message).await,
            AgentStatus::WaitingForInput => self.collect(message).await,
            AgentStatus::WaitingForApproval => self.approve(message).await,
            _ => self.run().await,
        };
        self.apply(result)
    }

    /// Pause from any non-terminal status.
    pub fn pause(&mut self) -> Result<AgentResult, DomainError> {
        self.lifecycle.pause()?;
        info!(agent_id = %self.agent_id, "Agent paused");
        Ok(self.decorate(AgentResult::new(AgentStatus::Paused, "Paused.")))
    }

    /// Return to the status the agent was paused from.
    pub fn unpause(&mut self) -> Result<AgentStatus, DomainError> {
        let status = self.lifecycle.unpause()?;
        info!(agent_id = %self.agent_id, status = %status, "Agent unpaused");
        Ok(status)
    }

    /// Stop the run for good, discarding any pending tool call.
    pub fn cancel(&mut self) -> Result<AgentResult, DomainError> {
        self.lifecycle.transition_to(AgentStatus::Cancelled)?;
        let trace = self
            .handler
            .export_continuation()
            .map(|mut c| {
                if let Some(tool) = c.pending().map(|p| p.tool_name().to_string()) {
                    c.settle(ToolTraceEntry::new(
                        tool,
                        TraceStatus::Rejected,
                        CANCELLED_AT_GATE,
                    ));
                }
                c.trace().to_vec()
            })
            .unwrap_or_default();
        self.handler.reset();
        info!(agent_id = %self.agent_id, "Agent cancelled");
        Ok(self.decorate(AgentResult::cancelled("Cancelled.").with_trace(&trace)))
    }

    fn start_over(&mut self) -> Result<(), DomainError> {
        self.lifecycle.restart()?;
        self.collected.clear();
        self.instruction = None;
        self.handler.reset();
        Ok(())
    }

    async fn begin(&mut self, instruction: &str) -> AgentResult {
        self.instruction = Some(instruction.to_string());
        self.advance().await
    }

    /// Next step once the instruction is known: ask for a field, ask for
    /// approval, or run.
    async fn advance(&mut self) -> AgentResult {
        if let Some(result) = self.prompt_for_missing(None) {
            return result;
        }
        if self.handler.needs_approval() {
            return AgentResult::waiting_for_approval(self.handler.approval_prompt(&self.collected));
        }
        if let Err(e) = self.lifecycle.transition_to(AgentStatus::Running) {
            return AgentResult::error(e.to_string());
        }
        self.run().await
    }

    fn prompt_for_missing(&self, problem: Option<String>) -> Option<AgentResult> {
        let missing = missing_fields(self.handler.input_fields(), &self.collected);
        let first = missing.first()?;
        let prompt = match problem {
            Some(problem) => format!("{} {}", problem, first.prompt),
            None => first.prompt.clone(),
        };
        let names = missing.iter().map(|f| f.name.clone()).collect();
        Some(AgentResult::waiting_for_input(prompt, names))
    }

    async fn collect(&mut self, message: &str) -> AgentResult {
        let spec = missing_fields(self.handler.input_fields(), &self.collected)
            .first()
            .map(|s| (*s).clone());
        let Some(spec) = spec else {
            return self.advance().await;
        };

        if let Err(e) = collect_field(&spec, message, &mut self.collected) {
            debug!(field = %spec.name, error = %e, "Rejected field value");
            return self
                .prompt_for_missing(Some(e.to_string()))
                .unwrap_or_else(|| AgentResult::error(e.to_string()));
        }
        debug!(field = %spec.name, "Collected field");
        self.advance().await
    }

    async fn approve(&mut self, reply: &str) -> AgentResult {
        if self.handler.has_pending_approval() {
            return self
                .handler
                .on_waiting_for_approval(reply, self.approval_parser.as_ref())
                .await;
        }

        match self.approval_parser.classify(reply).await {
            ApprovalDecision::Approved => {
                if let Err(e) = self.lifecycle.transition_to(AgentStatus::Running) {
                    return AgentResult::error(e.to_string());
                }
                self.run().await
            }
            ApprovalDecision::Rejected => AgentResult::cancelled("Okay, cancelled."),
            ApprovalDecision::Modify(text) => {
                let prompt = match apply_modifications(
                    self.handler.input_fields(),
                    &text,
                    &mut self.collected,
                ) {
                    Ok(changed) if !changed.is_empty() => {
                        debug!(fields = ?changed, "Applied modifications");
                        self.handler.approval_prompt(&self.collected)
                    }
                    Ok(_) => format!(
                        "I didn't catch a change. Reply yes to proceed, no to cancel, or send `field: value`.\n{}",
                        self.handler.approval_prompt(&self.collected)
                    ),
                    Err(e) => format!("{}\n{}", e, self.handler.approval_prompt(&self.collected)),
                };
                AgentResult::waiting_for_approval(prompt)
            }
        }
    }

    async fn run(&mut self) -> AgentResult {
        let instruction = self.instruction.clone().unwrap_or_default();
        self.handler.on_running(&instruction, &self.collected).await
    }

    /// Move the lifecycle to the result's status; an illegal step turns into
    /// `ERROR`.
    fn apply(&mut self, result: AgentResult) -> AgentResult {
        let result = match self.lifecycle.transition_to(result.status) {
            Ok(()) => result,
            Err(e) => {
                warn!(agent_id = %self.agent_id, error = %e, "Handler produced an illegal transition");
                if self.lifecycle.transition_to(AgentStatus::Error).is_err() {
                    warn!(agent_id = %self.agent_id, "Could not move agent to ERROR");
                }
                self.handler.reset();
                AgentResult::error(e.to_string()).with_metadata("rejectedResult", result.raw_message.into())
            }
        };
        if result.is_terminal() {
            self.handler.reset();
        }
        self.decorate(result)
    }

    fn decorate(&self, result: AgentResult) -> AgentResult {
        result
            .with_agent_id(self.agent_id.clone())
            .with_data(self.collected.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::approval_parser::{AutoApproveParser, AutoRejectParser};
    use agentry_domain::FieldValidator;

    /// Echoes the instruction and how many fields it received.
    struct EchoHandler {
        fields: Vec<FieldSpec>,
        needs_approval: bool,
        outcome: AgentStatus,
    }

    impl EchoHandler {
        fn boxed(fields: Vec<FieldSpec>, needs_approval: bool) -> Box<dyn AgentHandler> {
            Box::new(Self {
                fields,
                needs_approval,
                outcome: AgentStatus::Completed,
            })
        }
    }

    #[async_trait]
    impl AgentHandler for EchoHandler {
        fn input_fields(&self) -> &[FieldSpec] {
            &self.fields
        }

        fn needs_approval(&self) -> bool {
            self.needs_approval
        }

        async fn on_running(
            &mut self,
            instruction: &str,
            collected: &Map<String, Value>,
        ) -> AgentResult {
            AgentResult::new(
                self.outcome,
                format!("{} with {} fields", instruction, collected.len()),
            )
        }
    }

    fn booking_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::required("title", "What is the event called?"),
            FieldSpec::required("guests", "How many guests?")
                .with_validator(FieldValidator::Integer),
        ]
    }

    fn instance(handler: Box<dyn AgentHandler>, parser: Arc<dyn ApprovalParser>) -> AgentInstance {
        AgentInstance::new("booking", handler, parser)
    }

    #[tokio::test]
    async fn test_runs_immediately_without_fields() {
        let mut agent = instance(EchoHandler::boxed(vec![], false), Arc::new(AutoApproveParser));

        let result = agent.handle_message("hello").await;

        assert_eq!(result.status, AgentStatus::Completed);
        assert_eq!(result.raw_message, "hello with 0 fields");
        assert_eq!(result.agent_id.as_ref(), Some(agent.agent_id()));
        assert_eq!(agent.status(), AgentStatus::Completed);
    }

    #[tokio::test]
    async fn test_collects_fields_in_order_and_revalidates() {
        let mut agent = instance(
            EchoHandler::boxed(booking_fields(), false),
            Arc::new(AutoApproveParser),
        );

        let r = agent.handle_message("book a dinner").await;
        assert_eq!(r.status, AgentStatus::WaitingForInput);
        assert_eq!(r.raw_message, "What is the event called?");
        assert_eq!(r.missing_fields, Some(vec!["title".to_string(), "guests".to_string()]));

        let r = agent.handle_message("Team dinner").await;
        assert_eq!(r.status, AgentStatus::WaitingForInput);
        assert_eq!(r.missing_fields, Some(vec!["guests".to_string()]));

        let r = agent.handle_message("lots").await;
        assert_eq!(r.status, AgentStatus::WaitingForInput);
        assert!(r.raw_message.ends_with("How many guests?"));

        let r = agent.handle_message("8").await;
        assert_eq!(r.status, AgentStatus::Completed);
        assert_eq!(r.raw_message, "book a dinner with 2 fields");
        assert_eq!(r.data["guests"], 8);
    }

    #[tokio::test]
    async fn test_agent_level_approval_modify_then_approve() {
        let mut agent = instance(
            EchoHandler::boxed(booking_fields(), true),
            Arc::new(ModifyThenApprove::default()),
        );
        agent.handle_message("book").await;
        agent.handle_message("Dinner").await;
        let r = agent.handle_message("4").await;
        assert_eq!(r.status, AgentStatus::WaitingForApproval);
        assert!(r.raw_message.contains("- guests: 4"));

        let r = agent.handle_message("guests: 6").await;
        assert_eq!(r.status, AgentStatus::WaitingForApproval);
        assert!(r.raw_message.contains("- guests: 6"));

        let r = agent.handle_message("yes").await;
        assert_eq!(r.status, AgentStatus::Completed);
        assert_eq!(r.data["guests"], 6);
    }

    /// Treats the first reply as a modification and everything after as yes.
    #[derive(Default)]
    struct ModifyThenApprove {
        seen: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl ApprovalParser for ModifyThenApprove {
        async fn classify(&self, reply: &str) -> ApprovalDecision {
            if self.seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                ApprovalDecision::Modify(reply.to_string())
            } else {
                ApprovalDecision::Approved
            }
        }
    }

    #[tokio::test]
    async fn test_agent_level_rejection_cancels() {
        let mut agent = instance(EchoHandler::boxed(vec![], true), Arc::new(AutoRejectParser));
        let r = agent.handle_message("do it").await;
        assert_eq!(r.status, AgentStatus::WaitingForApproval);

        let r = agent.handle_message("no").await;
        assert_eq!(r.status, AgentStatus::Cancelled);
        assert_eq!(agent.status(), AgentStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_pause_blocks_messages_until_unpaused() {
        let mut agent = instance(
            EchoHandler::boxed(booking_fields(), false),
            Arc::new(AutoApproveParser),
        );
        agent.handle_message("book").await;
        agent.pause().unwrap();

        let r = agent.handle_message("Dinner").await;
        assert_eq!(r.status, AgentStatus::Paused);
        assert!(agent.collected().is_empty());

        assert_eq!(agent.unpause().unwrap(), AgentStatus::WaitingForInput);
        let r = agent.handle_message("Dinner").await;
        assert_eq!(r.missing_fields, Some(vec!["guests".to_string()]));
    }

    #[tokio::test]
    async fn test_cancel_and_terminal_guards() {
        let mut agent = instance(
            EchoHandler::boxed(booking_fields(), false),
            Arc::new(AutoApproveParser),
        );
        agent.handle_message("book").await;
        let r = agent.cancel().unwrap();
        assert_eq!(r.status, AgentStatus::Cancelled);

        assert!(agent.cancel().unwrap_err().is_invalid_transition());
        assert!(agent.pause().unwrap_err().is_invalid_transition());
    }

    #[tokio::test]
    async fn test_fresh_instruction_after_terminal_restarts() {
        let mut agent = instance(
            EchoHandler::boxed(booking_fields(), false),
            Arc::new(AutoApproveParser),
        );
        agent.handle_message("book").await;
        agent.handle_message("Dinner").await;
        agent.handle_message("2").await;
        assert_eq!(agent.status(), AgentStatus::Completed);

        let r = agent.handle_message("book lunch").await;
        assert_eq!(r.status, AgentStatus::WaitingForInput);
        assert!(r.data.is_empty());
    }

    #[tokio::test]
    async fn test_illegal_handler_status_becomes_error() {
        let handler = Box::new(EchoHandler {
            fields: vec![],
            needs_approval: false,
            outcome: AgentStatus::Initializing,
        });
        let mut agent = instance(handler, Arc::new(AutoApproveParser));

        let r = agent.handle_message("hi").await;
        assert_eq!(r.status, AgentStatus::Error);
        assert_eq!(agent.status(), AgentStatus::Error);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_keeps_progress() {
        let mut agent = instance(
            EchoHandler::boxed(booking_fields(), false),
            Arc::new(AutoApproveParser),
        );
        agent.handle_message("book a dinner").await;
        agent.handle_message("Dinner").await;

        let json = serde_json::to_string(&agent.snapshot()).unwrap();
        let snapshot: AgentSnapshot = serde_json::from_str(&json).unwrap();
        let mut restored = AgentInstance::from_snapshot(
            snapshot,
            EchoHandler::boxed(booking_fields(), false),
            Arc::new(AutoApproveParser),
        );

        assert_eq!(restored.agent_id(), agent.agent_id());
        assert_eq!(restored.status(), AgentStatus::WaitingForInput);
        let r = restored.handle_message("3").await;
        assert_eq!(r.status, AgentStatus::Completed);
        assert_eq!(r.raw_message, "book a dinner with 2 fields");
    }
}
