//! A single tool as seen by the ReAct loop.

use super::context::DomainToolContext;
use crate::ports::tool_handler::ToolHandler;
use agentry_domain::{ToolError, ToolSchema};
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Tool definition plus the handler that runs it.
#[derive(Clone)]
pub struct DomainTool {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the arguments.
    pub parameters: Value,
    /// Side-effecting tools pause the run for human approval before executing.
    pub needs_approval: bool,
    handler: Arc<dyn ToolHandler>,
}

impl DomainTool {
    pub fn new<H: ToolHandler + 'static>(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: H,
    ) -> Self {
        Self::from_arc(name, description, Arc::new(handler))
    }

    /// Build from a handler that is shared with something else.
    pub fn from_arc(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
            needs_approval: false,
            handler,
        }
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn requiring_approval(mut self) -> Self {
        self.needs_approval = true;
        self
    }

    pub fn schema(&self) -> ToolSchema {
        ToolSchema::new(&self.name, &self.description, self.parameters.clone())
    }

    /// Execute under `timeout`. Handler panics come back as
    /// [`ToolError::Panicked`], an elapsed timeout as [`ToolError::Timeout`].
    pub async fn run(
        &self,
        args: &Map<String, Value>,
        ctx: &DomainToolContext,
        timeout: Duration,
    ) -> Result<String, ToolError> {
        let guarded = AssertUnwindSafe(self.handler.execute(args, ctx)).catch_unwind();
        match tokio::time::timeout(timeout, guarded).await {
            Err(_) => Err(ToolError::Timeout(timeout)),
            Ok(Err(payload)) => Err(ToolError::Panicked(panic_message(payload.as_ref()))),
            Ok(Ok(result)) => result,
        }
    }

    /// Preview shown at the approval gate.
    ///
    /// Falls back to [`default_preview`](Self::default_preview) when the
    /// handler has none, fails, or panics.
    pub async fn render_preview(&self, args: &Map<String, Value>, ctx: &DomainToolContext) -> String {
        let guarded = AssertUnwindSafe(self.handler.preview(args, ctx)).catch_unwind();
        match guarded.await {
            Ok(Some(Ok(preview))) => preview,
            Ok(None) => self.default_preview(args),
            Ok(Some(Err(e))) => {
                warn!(tool = %self.name, error = %e, "Preview failed, using default");
                self.default_preview(args)
            }
            Err(payload) => {
                warn!(
                    tool = %self.name,
                    panic = %panic_message(payload.as_ref()),
                    "Preview panicked, using default"
                );
                self.default_preview(args)
            }
        }
    }

    /// `About to execute: name({...})`
    pub fn default_preview(&self, args: &Map<String, Value>) -> String {
        format!(
            "About to execute: {}({})",
            self.name,
            Value::Object(args.clone())
        )
    }
}

impl std::fmt::Debug for DomainTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainTool")
            .field("name", &self.name)
            .field("needs_approval", &self.needs_approval)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
