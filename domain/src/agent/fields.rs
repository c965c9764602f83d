//! Declarative input fields collected before an agent can run.
//!
//! Each agent type declares an ordered list of [`FieldSpec`]s. The lifecycle
//! driver walks the list, asking for the first missing required field and
//! validating whatever the user replies with.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a raw reply is checked and converted before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum FieldValidator {
    /// Accept any reply, trimmed.
    Any,
    /// Reject blank replies.
    NonEmpty,
    /// Parse as a signed integer.
    Integer,
    /// Case-insensitive match against a fixed set; the canonical spelling is stored.
    OneOf(Vec<String>),
}

impl FieldValidator {
    pub fn validate(&self, field: &str, raw: &str) -> Result<Value, DomainError> {
        let trimmed = raw.trim();
        let invalid = |reason: String| DomainError::InvalidFieldValue {
            field: field.to_string(),
            reason,
        };
        match self {
            FieldValidator::Any => Ok(Value::String(trimmed.to_string())),
            FieldValidator::NonEmpty if trimmed.is_empty() => {
                Err(invalid("value cannot be empty".to_string()))
            }
            FieldValidator::NonEmpty => Ok(Value::String(trimmed.to_string())),
            FieldValidator::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| invalid(format!("expected an integer, got '{}'", trimmed))),
            FieldValidator::OneOf(options) => options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(trimmed))
                .map(|o| Value::String(o.clone()))
                .ok_or_else(|| invalid(format!("expected one of: {}", options.join(", ")))),
        }
    }
}

/// A tagged schema entry: `name`, `prompt`, `required`, `validator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Question shown to the user when this field is missing.
    pub prompt: String,
    pub required: bool,
    pub validator: FieldValidator,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            required: true,
            validator: FieldValidator::NonEmpty,
        }
    }

    pub fn optional(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            required: false,
            validator: FieldValidator::Any,
        }
    }

    pub fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validator = validator;
        self
    }
}

/// Required fields not yet present in `collected`, in declaration order.
pub fn missing_fields<'a>(specs: &'a [FieldSpec], collected: &Map<String, Value>) -> Vec<&'a FieldSpec> {
    specs
        .iter()
        .filter(|spec| spec.required && !collected.contains_key(&spec.name))
        .collect()
}

/// Validate `raw` against `spec` and store it.
pub fn collect_field(
    spec: &FieldSpec,
    raw: &str,
    collected: &mut Map<String, Value>,
) -> Result<(), DomainError> {
    let value = spec.validator.validate(&spec.name, raw)?;
    collected.insert(spec.name.clone(), value);
    Ok(())
}

/// Apply `field: value` / `field=value` lines from a free-text reply to known
/// fields. Returns the names of the fields that changed.
pub fn apply_modifications(
    specs: &[FieldSpec],
    text: &str,
    collected: &mut Map<String, Value>,
) -> Result<Vec<String>, DomainError> {
    let mut changed = Vec::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':').or_else(|| line.split_once('=')) else {
            continue;
        };
        let key = key.trim();
        let Some(spec) = specs.iter().find(|s| s.name.eq_ignore_ascii_case(key)) else {
            continue;
        };
        collect_field(spec, value, collected)?;
        changed.push(spec.name.clone());
    }
    Ok(changed)
}
