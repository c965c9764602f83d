//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod approval_parser;
pub mod conversation_logger;
pub mod llm_client;
pub mod snapshot_store;
pub mod tool_handler;
