//! Agent registry
//!
//! Static catalogue of agent types, populated once at start-up. Each entry
//! pairs a descriptor (what the agent is for, which phrases route to it) with
//! a factory that builds a fresh handler.

use crate::config::ReactParams;
use crate::ports::approval_parser::ApprovalParser;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::tools::context::DomainToolContext;
use crate::use_cases::agent_lifecycle::{AgentHandler, AgentInstance};
use agentry_domain::AgentSnapshot;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool '{0}' is registered twice")]
    DuplicateTool(String),

    #[error("Agent '{0}' is registered twice")]
    DuplicateAgent(String),

    #[error("Unknown agent type: {0}")]
    UnknownAgent(String),
}

/// What the outer router knows about an agent type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDescriptor {
    pub name: String,
    pub description: String,
    pub capabilities: Vec<String>,
    /// Phrases that route a message to this agent (case-insensitive substring).
    pub triggers: Vec<String>,
}

impl AgentDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            capabilities: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: &[&str]) -> Self {
        self.capabilities = capabilities.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_triggers(mut self, triggers: &[&str]) -> Self {
        self.triggers = triggers.iter().map(|t| t.to_lowercase()).collect();
        self
    }

    fn matches(&self, text: &str) -> bool {
        self.triggers.iter().any(|t| !t.is_empty() && text.contains(t.as_str()))
    }
}

/// Shared collaborators handed to every factory.
#[derive(Clone)]
pub struct AgentBuildContext {
    pub tool_context: Arc<DomainToolContext>,
    pub params: ReactParams,
    pub logger: Arc<dyn ConversationLogger>,
    pub approval_parser: Arc<dyn ApprovalParser>,
    pub cancellation_token: Option<CancellationToken>,
}

impl AgentBuildContext {
    pub fn new(tool_context: Arc<DomainToolContext>, approval_parser: Arc<dyn ApprovalParser>) -> Self {
        Self {
            tool_context,
            params: ReactParams::default(),
            logger: Arc::new(NoConversationLogger),
            approval_parser,
            cancellation_token: None,
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
}

pub type AgentFactory =
    Arc<dyn Fn(&AgentBuildContext) -> Result<Box<dyn AgentHandler>, RegistryError> + Send + Sync>;

struct AgentEntry {
    descriptor: AgentDescriptor,
    factory: AgentFactory,
}

/// Agent types in registration order.
#[derive(Default)]
pub struct AgentRegistry {
    entries: Vec<AgentEntry>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        descriptor: AgentDescriptor,
        factory: AgentFactory,
    ) -> Result<(), RegistryError> {
        if self.descriptor(&descriptor.name).is_some() {
            return Err(RegistryError::DuplicateAgent(descriptor.name));
        }
        debug!(agent = %descriptor.name, "Registered agent type");
        self.entries.push(AgentEntry { descriptor, factory });
        Ok(())
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    pub fn descriptor(&self, name: &str) -> Option<&AgentDescriptor> {
        self.descriptors().find(|d| d.name == name)
    }

    /// First agent (in registration order) with a trigger occurring in `text`.
    pub fn route(&self, text: &str) -> Option<&AgentDescriptor> {
        let lowered = text.to_lowercase();
        self.descriptors().find(|d| d.matches(&lowered))
    }

    /// Build a fresh instance in `INITIALIZING`.
    pub fn create(&self, name: &str, ctx: &AgentBuildContext) -> Result<AgentInstance, RegistryError> {
        let handler = self.build_handler(name, ctx)?;
        Ok(AgentInstance::new(name, handler, ctx.approval_parser.clone()))
    }

    /// Rebuild an instance from its persisted snapshot.
    pub fn restore(
        &self,
        snapshot: AgentSnapshot,
        ctx: &AgentBuildContext,
    ) -> Result<AgentInstance, RegistryError> {
        let handler = self.build_handler(&snapshot.agent_type, ctx)?;
        Ok(AgentInstance::from_snapshot(
            snapshot,
            handler,
            ctx.approval_parser.clone(),
        ))
    }

    fn build_handler(
        &self,
        name: &str,
        ctx: &AgentBuildContext,
    ) -> Result<Box<dyn AgentHandler>, RegistryError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor.name == name)
            .ok_or_else(|| RegistryError::UnknownAgent(name.to_string()))?;
        (entry.factory)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::approval_parser::AutoApproveParser;
    use crate::test_support::{ScriptedLlm, context_with};
    use crate::tools::registry::ToolRegistry;
    use crate::use_cases::domain_agent::DomainAgent;
    use crate::use_cases::react_loop::ReactController;
    use agentry_domain::{AgentStatus, LlmResponse};

    fn build_ctx(llm: Arc<ScriptedLlm>) -> AgentBuildContext {
        AgentBuildContext::new(Arc::new(context_with(llm)), Arc::new(AutoApproveParser))
    }

    fn echo_factory() -> AgentFactory {
        Arc::new(|ctx: &AgentBuildContext| {
            let controller = ReactController::new(
                Arc::new(ToolRegistry::new()),
                ctx.tool_context.clone(),
                "You are a test agent.",
            )
            .with_params(ctx.params.clone());
            Ok(Box::new(DomainAgent::new(controller)) as Box<dyn AgentHandler>)
        })
    }

    fn registry() -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        registry
            .register(
                AgentDescriptor::new("calendar", "Manages events")
                    .with_capabilities(&["create events"])
                    .with_triggers(&["meeting", "Calendar"]),
                echo_factory(),
            )
            .unwrap();
        registry
            .register(
                AgentDescriptor::new("notes", "Keeps notes").with_triggers(&["note"]),
                echo_factory(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_route_is_case_insensitive_and_ordered() {
        let registry = registry();
        assert_eq!(registry.route("Book a MEETING note").unwrap().name, "calendar");
        assert_eq!(registry.route("open my calendar").unwrap().name, "calendar");
        assert_eq!(registry.route("write a note").unwrap().name, "notes");
        assert!(registry.route("what's the weather").is_none());
        assert_eq!(
            registry.descriptors().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            vec!["calendar", "notes"]
        );
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let mut registry = registry();
        let err = registry
            .register(AgentDescriptor::new("notes", "again"), echo_factory())
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateAgent("notes".to_string()));
    }

    #[tokio::test]
    async fn test_create_and_unknown() {
        let llm = ScriptedLlm::new(vec![LlmResponse::from_text("Hi")]);
        let ctx = build_ctx(llm);
        let registry = registry();

        let mut agent = registry.create("notes", &ctx).unwrap();
        assert_eq!(agent.status(), AgentStatus::Initializing);
        let result = agent.handle_message("hello").await;
        assert_eq!(result.status, AgentStatus::Completed);
        assert_eq!(result.raw_message, "Hi");

        let err = registry.create("weather", &ctx).err().unwrap();
        assert_eq!(err, RegistryError::UnknownAgent("weather".to_string()));
    }
}
