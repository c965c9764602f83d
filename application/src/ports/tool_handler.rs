//! Tool handler port
//!
//! One implementation per concrete tool. The ReAct loop never calls a
//! handler directly; it goes through `DomainTool`, which adds the timeout,
//! panic guard and preview fallback.

use crate::tools::context::DomainToolContext;
use agentry_domain::ToolError;
use async_trait::async_trait;
use serde_json::{Map, Value};

#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool. `args` has already been coerced to a map.
    async fn execute(
        &self,
        args: &Map<String, Value>,
        ctx: &DomainToolContext,
    ) -> Result<String, ToolError>;

    /// Human-readable description of what `execute` would do, shown at the
    /// approval gate. `None` means "use the default preview".
    async fn preview(
        &self,
        _args: &Map<String, Value>,
        _ctx: &DomainToolContext,
    ) -> Option<Result<String, ToolError>> {
        None
    }
}
