//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool invocation requested by the LLM.
///
/// `arguments` is kept as raw JSON because models occasionally emit
/// something other than an object; see [`ToolCall::args_map`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// API-assigned id, echoed back on the tool-role result message.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Arguments as a key/value map.
    ///
    /// Anything other than a JSON object (string, array, null, ...) is
    /// treated as an empty map rather than rejected.
    pub fn args_map(&self) -> Map<String, Value> {
        match &self.arguments {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        }
    }

    /// Whether [`args_map`](Self::args_map) had to discard a non-object value.
    pub fn has_malformed_arguments(&self) -> bool {
        !matches!(self.arguments, Value::Object(_) | Value::Null)
    }

    /// Arguments encoded as a JSON string, the form the chat API expects on
    /// assistant messages.
    pub fn arguments_json(&self) -> String {
        match &self.arguments {
            Value::Null => "{}".to_string(),
            other => other.to_string(),
        }
    }
}

/// JSON-schema description of a tool, exposed to the LLM every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// `{type: "function", function: {name, description, parameters}}`
    pub fn to_api_json(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Tool-choice policy sent with each LLM turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model may answer in natural language.
    Auto,
    /// The model must call at least one tool.
    Required,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::Required => "required",
        }
    }
}

impl std::fmt::Display for ToolChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
