//! Tool domain module
//!
//! A tool is something the LLM can ask the agent to do. The domain layer only
//! knows the *shape* of that exchange:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────────┐
//! │ ToolSchema   │───▶│ ToolCall     │───▶│ Result<String,       │
//! │ (per turn)   │    │ (from LLM)   │    │        ToolError>    │
//! └──────────────┘    └──────────────┘    └──────────────────────┘
//! ```
//!
//! Executors, previews and the per-agent registry live in the application
//! layer because they need the LLM client and execution context.

pub mod entities;
pub mod value_objects;

pub use entities::{ToolCall, ToolChoice, ToolSchema};
pub use value_objects::{ToolError, require_str};
