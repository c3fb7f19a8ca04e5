//! Tool domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire-facing parameter map of a tool call.
///
/// Kept dynamic: providers accept arbitrary parameter shapes.
pub type Parameters = serde_json::Map<String, Value>;

/// A registered tool, as loaded from the registry table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique name of the tool (e.g., "jira_search_issues")
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Provider identifier, stored lower-case (e.g., "jira")
    #[serde(default)]
    pub provider: String,
    /// JSON-schema-like description of accepted parameters
    #[serde(default = "empty_schema")]
    pub parameters_schema: Value,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Offered by default when no specific provider is detected
    #[serde(default)]
    pub primary_search: bool,
}

fn empty_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

fn default_enabled() -> bool {
    true
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            provider: provider.into().to_lowercase(),
            parameters_schema: empty_schema(),
            enabled: true,
            primary_search: false,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.parameters_schema = schema;
        self
    }

    pub fn primary_search(mut self) -> Self {
        self.primary_search = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Parse one registry row.
    pub fn from_record(row: Value) -> Result<Self, DomainError> {
        let descriptor: ToolDescriptor = serde_json::from_value(row)
            .map_err(|e| DomainError::InvalidDescriptor(e.to_string()))?;
        if descriptor.name.trim().is_empty() {
            return Err(DomainError::InvalidDescriptor("empty tool name".into()));
        }
        Ok(descriptor.normalized())
    }

    /// Normalize fields loaded from an external store.
    pub fn normalized(mut self) -> Self {
        self.provider = self.provider.trim().to_lowercase();
        self
    }

    /// Offered in manifests and default fallbacks.
    pub fn is_primary(&self) -> bool {
        self.enabled && self.primary_search
    }
}

/// A request to invoke one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub name: String,
    #[serde(default)]
    pub parameters: Parameters,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Parameters::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Get a string parameter
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }
}
