//! Application layer for agentry
//!
//! This crate contains the ReAct loop, the agent lifecycle driver, port
//! definitions and loop configuration. It depends only on the domain layer.

pub mod agents;
pub mod config;
pub mod ports;
pub mod tools;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use agents::{AgentBuildContext, AgentDescriptor, AgentFactory, AgentRegistry, RegistryError};
pub use config::ReactParams;
pub use ports::{
    approval_parser::{ApprovalParser, AutoApproveParser, AutoRejectParser},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_client::{LlmClient, LlmError},
    snapshot_store::{InMemorySnapshotStore, SnapshotStore, StoreError},
    tool_handler::ToolHandler,
};
pub use tools::{DomainTool, DomainToolContext, ToolRegistry};
pub use use_cases::agent_lifecycle::{AgentHandler, AgentInstance};
pub use use_cases::domain_agent::DomainAgent;
pub use use_cases::react_loop::ReactController;
