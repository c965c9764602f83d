//! Use cases
//!
//! - [`react_loop`] — the ReAct loop controller with its approval gate
//! - [`agent_lifecycle`] — per-instance lifecycle driver and the [`AgentHandler`](agent_lifecycle::AgentHandler) seam
//! - [`domain_agent`] — the handler that plugs the controller into the lifecycle

pub mod agent_lifecycle;
pub mod domain_agent;
pub mod react_loop;
