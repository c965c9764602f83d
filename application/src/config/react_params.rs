//! ReAct loop parameters.
//!
//! [`ReactParams`] groups the static parameters that bound a domain agent's
//! reason-then-act loop. They are application-layer concerns; the file
//! configuration in the infrastructure layer converts into this type.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Loop control parameters for the ReAct controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactParams {
    /// Maximum LLM decision turns per run (resumptions included).
    pub max_domain_turns: usize,
    /// Upper bound on a single tool executor call.
    pub tool_timeout: Duration,
    /// Tool results longer than this (in characters) are truncated.
    pub max_tool_result_chars: usize,
}

impl Default for ReactParams {
    fn default() -> Self {
        Self {
            max_domain_turns: 6,
            tool_timeout: Duration::from_secs(30),
            max_tool_result_chars: 4000,
        }
    }
}

impl ReactParams {
    // ==================== Builder Methods ====================

    pub fn with_max_domain_turns(mut self, max: usize) -> Self {
        self.max_domain_turns = max;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_max_tool_result_chars(mut self, max: usize) -> Self {
        self.max_tool_result_chars = max;
        self
    }
}
