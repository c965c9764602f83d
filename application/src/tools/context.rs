//! Tool execution context.

use crate::ports::llm_client::LlmClient;
use serde_json::Value;
use std::sync::Arc;

/// Read-only bundle passed to every tool executor and preview.
///
/// Shared by reference (`Arc`) across all tool calls of an agent instance and
/// never mutated by the ReAct loop.
#[derive(Clone)]
pub struct DomainToolContext {
    pub llm: Arc<dyn LlmClient>,
    pub tenant_id: String,
    pub user_profile: Option<Value>,
    pub context_hints: Option<Value>,
}

impl DomainToolContext {
    pub fn new(llm: Arc<dyn LlmClient>, tenant_id: impl Into<String>) -> Self {
        Self {
            llm,
            tenant_id: tenant_id.into(),
            user_profile: None,
            context_hints: None,
        }
    }

    pub fn with_user_profile(mut self, profile: Value) -> Self {
        self.user_profile = Some(profile);
        self
    }

    pub fn with_context_hints(mut self, hints: Value) -> Self {
        self.context_hints = Some(hints);
        self
    }

    /// Look up a string hint, e.g. `timezone`.
    pub fn hint(&self, key: &str) -> Option<&str> {
        self.context_hints
            .as_ref()
            .and_then(|h| h.get(key))
            .and_then(|v| v.as_str())
    }
}

impl std::fmt::Debug for DomainToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainToolContext")
            .field("tenant_id", &self.tenant_id)
            .field("user_profile", &self.user_profile)
            .field("context_hints", &self.context_hints)
            .finish_non_exhaustive()
    }
}
