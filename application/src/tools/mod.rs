//! Per-agent tool set.
//!
//! - [`DomainTool`] — schema + handler + approval flag for one tool
//! - [`ToolRegistry`] — the ordered, name-unique tool set of one agent
//! - [`DomainToolContext`] — read-only bundle handed to every executor

pub mod context;
pub mod domain_tool;
pub mod registry;

pub use context::DomainToolContext;
pub use domain_tool::DomainTool;
pub use registry::ToolRegistry;
