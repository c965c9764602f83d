//! Chat session domain.
//!
//! - [`entities::ChatMessage`] — one entry of the ordered chat log sent to the LLM
//! - [`entities::AssistantToolCall`] — wire form of a tool call on an assistant message
//! - [`response::LlmResponse`] — one decision turn returned by the LLM

pub mod entities;
pub mod response;

pub use entities::{AssistantToolCall, ChatMessage, FunctionCall, Role};
pub use response::LlmResponse;
