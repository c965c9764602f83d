//! ReAct loop controller
//!
//! Drives one domain agent's bounded reason-then-act loop:
//!
//! ```text
//! on_running(instruction)
//!   └─ run_react
//!        ├─ drain calls left over from a paused batch
//!        └─ for each turn < max_domain_turns
//!             ├─ LLM decision (turn 0 forced to call a tool)
//!             ├─ no tool calls → COMPLETED
//!             └─ dispatch batch ─┬─ all executed → next turn
//!                                └─ approval gate → WAITING_FOR_APPROVAL
//! on_waiting_for_approval(reply)
//!   ├─ approved → resume → run_react
//!   ├─ rejected → CANCELLED
//!   └─ modify   → CANCELLED
//! ```
//!
//! Between two messages the whole run lives in a [`ReactContinuation`]; the
//! controller holds it while a run is in flight and drops it as soon as the
//! run reaches a terminal status.

mod approval;
mod dispatch;

use crate::config::ReactParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_client::LlmError;
use crate::tools::context::DomainToolContext;
use crate::tools::registry::ToolRegistry;
use agentry_domain::{
    AgentResult, ChatMessage, LlmResponse, ReactContinuation, ToolCall, ToolChoice, ToolSchema,
};
use dispatch::DispatchOutcome;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use approval::{MODIFY_SUMMARY_MAX_CHARS, NOTHING_TO_RESUME};

/// Final answer when the turn budget runs out before the LLM stops calling tools.
pub const TURN_BUDGET_EXHAUSTED: &str = "Sorry, I couldn't finish this within the allowed number \
     of steps. Here is where I got to; please try again or narrow the request.";

/// Returned when a run is stopped through the cancellation token.
pub const RUN_CANCELLED: &str = "The run was cancelled.";

enum TurnError {
    Cancelled,
    Llm(LlmError),
}

pub struct ReactController {
    tools: Arc<ToolRegistry>,
    context: Arc<DomainToolContext>,
    params: ReactParams,
    system_prompt: String,
    logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
    state: Option<ReactContinuation>,
}

impl ReactController {
    pub fn new(
        tools: Arc<ToolRegistry>,
        context: Arc<DomainToolContext>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            tools,
            context,
            params: ReactParams::default(),
            system_prompt: system_prompt.into(),
            logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
            state: None,
        }
    }

    pub fn with_params(mut self, params: ReactParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &ReactParams {
        &self.params
    }

    /// The in-flight run, if any.
    pub fn continuation(&self) -> Option<&ReactContinuation> {
        self.state.as_ref()
    }

    /// Put back a continuation exported before the agent was persisted.
    pub fn restore(&mut self, continuation: ReactContinuation) {
        self.state = Some(continuation);
    }

    /// Forget the in-flight run.
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn has_pending(&self) -> bool {
        self.state.as_ref().is_some_and(ReactContinuation::is_paused)
    }

    /// Handle a message while the agent is `RUNNING`.
    ///
    /// With a tool call waiting this is a wake-up after approval and goes
    /// straight to [`resume`](Self::resume); otherwise `instruction` starts a
    /// brand-new run.
    pub async fn on_running(&mut self, instruction: &str) -> AgentResult {
        if self.has_pending() {
            return self.resume().await;
        }

        info!(tools = self.tools.len(), "Starting ReAct run");
        let mut state = ReactContinuation::start(&self.system_prompt, instruction);
        let result = self.run_react(&mut state, VecDeque::new()).await;
        self.settle_run(state, result)
    }

    /// Core loop. `carried` holds calls after the approved one in its batch.
    async fn run_react(
        &self,
        state: &mut ReactContinuation,
        carried: VecDeque<ToolCall>,
    ) -> AgentResult {
        if !carried.is_empty() {
            debug!(count = carried.len(), "Draining calls left over from the paused batch");
            if let DispatchOutcome::Paused(result) = self.dispatch(state, carried).await {
                return result;
            }
        }

        let schemas = self.tools.schemas();
        while state.turn() < self.params.max_domain_turns {
            let turn = state.advance_turn();
            let choice = if turn == 0 && !schemas.is_empty() {
                ToolChoice::Required
            } else {
                ToolChoice::Auto
            };

            let response = match self.decide(state, &schemas, choice, turn).await {
                Ok(response) => response,
                Err(TurnError::Cancelled) => {
                    info!(turn, "Run cancelled before LLM call");
                    return AgentResult::cancelled(RUN_CANCELLED);
                }
                Err(TurnError::Llm(e)) => {
                    warn!(turn, error = %e, "LLM request failed");
                    return AgentResult::error(format!("LLM request failed: {}", e));
                }
            };

            if !response.has_tool_calls() {
                debug!(turn, "LLM answered without tool calls");
                return AgentResult::completed(response.text_content());
            }

            debug!(turn, calls = response.tool_calls.len(), "LLM requested tool calls");
            state.push_message(ChatMessage::assistant_with_tool_calls(
                response.content.as_deref(),
                &response.tool_calls,
            ));
            if let DispatchOutcome::Paused(result) =
                self.dispatch(state, response.tool_calls.into()).await
            {
                return result;
            }
        }

        warn!(
            max_turns = self.params.max_domain_turns,
            "Turn budget exhausted without a final answer"
        );
        AgentResult::completed(TURN_BUDGET_EXHAUSTED)
    }

    /// One LLM decision call, raced against the cancellation token.
    async fn decide(
        &self,
        state: &ReactContinuation,
        schemas: &[ToolSchema],
        choice: ToolChoice,
        turn: usize,
    ) -> Result<LlmResponse, TurnError> {
        if self.is_cancelled() {
            return Err(TurnError::Cancelled);
        }

        self.emit(
            "react_turn",
            json!({
                "turn": turn,
                "tool_choice": choice.as_str(),
                "messages": state.messages().len(),
            }),
        );

        let tools = (!schemas.is_empty()).then_some(schemas);
        let call = self.context.llm.chat_completion(state.messages(), tools, choice);
        match &self.cancellation_token {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(TurnError::Cancelled),
                response = call => response.map_err(TurnError::Llm),
            },
            None => call.await.map_err(TurnError::Llm),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Attach the trace and decide whether the continuation survives.
    fn settle_run(&mut self, state: ReactContinuation, result: AgentResult) -> AgentResult {
        let result = result.with_trace(state.trace());
        if result.is_terminal() {
            info!(
                status = %result.status,
                tool_calls = state.trace().len(),
                turns = state.turn(),
                "ReAct run finished"
            );
            self.emit(
                "run_finished",
                json!({
                    "status": result.status.as_str(),
                    "turns": state.turn(),
                    "tool_calls": state.trace().len(),
                }),
            );
            self.state = None;
        } else {
            self.state = Some(state);
        }
        result
    }

    fn emit(&self, event_type: &'static str, payload: serde_json::Value) {
        self.logger.log(ConversationEvent::new(event_type, payload));
    }
}
