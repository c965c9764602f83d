//! Raw TOML configuration data types
//!
//! These structs mirror the config file one-to-one. Conversion into the
//! application's [`ReactParams`] happens here so the rest of the binary never
//! sees raw seconds or unvalidated values.
//!
//! ```toml
//! [react]
//! max_domain_turns = 6
//! tool_timeout_seconds = 30
//! max_tool_result_chars = 4000
//!
//! [llm]
//! model = "gpt-4o-mini"
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! request_timeout_seconds = 60
//!
//! [logging]
//! conversation_log = "~/.local/state/agentry/conversation.jsonl"
//!
//! [store]
//! dir = "~/.local/share/agentry/sessions"
//! ```

use agentry_application::ReactParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("react.max_domain_turns cannot be 0")]
    ZeroTurns,

    #[error("react.tool_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("react.max_tool_result_chars cannot be 0")]
    ZeroResultChars,

    #[error("llm.model cannot be empty")]
    EmptyModelName,
}

/// `[react]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReactConfig {
    pub max_domain_turns: usize,
    pub tool_timeout_seconds: u64,
    pub max_tool_result_chars: usize,
}

impl Default for FileReactConfig {
    fn default() -> Self {
        let params = ReactParams::default();
        Self {
            max_domain_turns: params.max_domain_turns,
            tool_timeout_seconds: params.tool_timeout.as_secs(),
            max_tool_result_chars: params.max_tool_result_chars,
        }
    }
}

impl FileReactConfig {
    pub fn to_params(&self) -> ReactParams {
        ReactParams::default()
            .with_max_domain_turns(self.max_domain_turns)
            .with_tool_timeout(Duration::from_secs(self.tool_timeout_seconds))
            .with_max_tool_result_chars(self.max_tool_result_chars)
    }
}

/// `[llm]` section: an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    pub model: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub request_timeout_seconds: u64,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_seconds: 60,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of ReAct events. Disabled when unset.
    pub conversation_log: Option<PathBuf>,
}

/// `[store]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// Directory holding one snapshot file per session. Defaults to the
    /// platform data dir when unset.
    pub dir: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub react: FileReactConfig,
    pub llm: FileLlmConfig,
    pub logging: FileLoggingConfig,
    pub store: FileStoreConfig,
}

impl FileConfig {
    /// Reject values that would make the loop or client unusable.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.react.max_domain_turns == 0 {
            return Err(ConfigValidationError::ZeroTurns);
        }
        if self.react.tool_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.react.max_tool_result_chars == 0 {
            return Err(ConfigValidationError::ZeroResultChars);
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        Ok(())
    }
}
