//! Tool domain value objects — errors raised by tool executors.

use std::time::Duration;
use thiserror::Error;

/// Error returned by a tool executor or preview.
///
/// None of these escape the agent: the ReAct loop turns every variant into
/// a natural-language tool result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("tool panicked: {0}")]
    Panicked(String),
}

impl ToolError {
    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::ExecutionFailed(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Read a required string argument from a coerced argument map.
pub fn require_str<'a>(
    args: &'a serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::MissingArgument(key.to_string()))
}
