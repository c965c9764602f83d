//! Domain agent: an [`AgentHandler`] backed by the ReAct loop controller.

use super::agent_lifecycle::AgentHandler;
use super::react_loop::ReactController;
use crate::ports::approval_parser::ApprovalParser;
use agentry_domain::{AgentResult, FieldSpec, ReactContinuation};
use async_trait::async_trait;
use serde_json::{Map, Value};

pub struct DomainAgent {
    controller: ReactController,
    fields: Vec<FieldSpec>,
    needs_approval: bool,
}

impl DomainAgent {
    pub fn new(controller: ReactController) -> Self {
        Self {
            controller,
            fields: Vec::new(),
            needs_approval: false,
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = fields;
        self
    }

    /// Confirm the collected task with the user before the loop starts.
    pub fn requiring_approval(mut self) -> Self {
        self.needs_approval = true;
        self
    }

    pub fn controller(&self) -> &ReactController {
        &self.controller
    }
}

/// The instruction plus any collected fields, as the user turn of the run.
fn compose_instruction(instruction: &str, collected: &Map<String, Value>) -> String {
    if collected.is_empty() {
        return instruction.to_string();
    }
    let mut text = format!("{}\n\nDetails:", instruction);
    for (key, value) in collected {
        match value {
            Value::String(s) => text.push_str(&format!("\n- {}: {}", key, s)),
            other => text.push_str(&format!("\n- {}: {}", key, other)),
        }
    }
    text
}

#[async_trait]
impl AgentHandler for DomainAgent {
    fn input_fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn needs_approval(&self) -> bool {
        self.needs_approval
    }

    async fn on_running(&mut self, instruction: &str, collected: &Map<String, Value>) -> AgentResult {
        if self.controller.has_pending() {
            return self.controller.resume().await;
        }
        let instruction = compose_instruction(instruction, collected);
        self.controller.on_running(&instruction).await
    }

    async fn on_waiting_for_approval(
        &mut self,
        reply: &str,
        parser: &dyn ApprovalParser,
    ) -> AgentResult {
        self.controller.on_waiting_for_approval(reply, parser).await
    }

    fn has_pending_approval(&self) -> bool {
        self.controller.has_pending()
    }

    fn export_continuation(&self) -> Option<ReactContinuation> {
        self.controller.continuation().cloned()
    }

    fn restore_continuation(&mut self, continuation: ReactContinuation) {
        self.controller.restore(continuation);
    }

    fn reset(&mut self) {
        self.controller.reset();
    }
}
