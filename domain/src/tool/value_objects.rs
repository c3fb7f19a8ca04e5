//! Tool result value object.
//!
//! Handlers return provider-native JSON. A [`ToolResult`] is always a mapping:
//! non-mapping handler output is wrapped as `{"result": value}`. Failures are
//! mappings too and always carry an `error` key:
//!
//! | Constructor | `error` |
//! |-------------|---------|
//! | [`ToolResult::unsupported_tool`] | `Unsupported tool name: <name>` |
//! | [`ToolResult::no_handler`] | `No handler function found for tool: <name>` |
//! | [`ToolResult::auth_required`] | `<provider>_auth_required` |
//! | [`ToolResult::upstream`] | `<provider>_api_error` |
//! | [`ToolResult::timeout`] | `timeout` |
//! | [`ToolResult::invalid_argument`] | the message itself |

use crate::core::string::is_falsy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolResult(Map<String, Value>);

impl ToolResult {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Normalize arbitrary handler output into a mapping.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                Self(map)
            }
        }
    }

    pub fn unsupported_tool(name: &str) -> Self {
        Self::from_value(json!({
            "error": format!("Unsupported tool name: {}", name),
            "tool": name,
        }))
    }

    pub fn no_handler(name: &str) -> Self {
        Self::from_value(json!({
            "error": format!("No handler function found for tool: {}", name),
            "tool": name,
        }))
    }

    /// The user has to authorize `provider` before the call can run.
    pub fn auth_required(provider: &str, auth_url: &str, message: impl Into<String>) -> Self {
        Self::from_value(json!({
            "ok": false,
            "error": format!("{}_auth_required", provider),
            "auth_required": true,
            "provider": provider,
            "auth_url": auth_url,
            "message": message.into(),
        }))
    }

    /// A provider answered with a failure.
    pub fn upstream(provider: &str, status: Option<u16>, details: impl Into<String>) -> Self {
        let mut result = Self::from_value(json!({
            "ok": false,
            "error": format!("{}_api_error", provider),
            "provider": provider,
            "details": details.into(),
        }));
        if let Some(status) = status {
            result.0.insert("status".to_string(), json!(status));
        }
        result
    }

    pub fn timeout(tool: &str, seconds: u64) -> Self {
        Self::from_value(json!({
            "error": "timeout",
            "tool": tool,
            "message": format!("{} did not finish within {}s", tool, seconds),
        }))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::from_value(json!({ "error": message.into() }))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Error-shaped: carries an `error` key, whatever its value.
    pub fn is_error(&self) -> bool {
        self.0.contains_key("error")
    }

    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    /// No meaningful content: every top-level value is falsy.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(is_falsy)
    }

    /// Only non-empty, non-error results may be cached.
    pub fn is_cacheable(&self) -> bool {
        !self.is_empty() && !self.is_error()
    }

    pub fn is_auth_required(&self) -> bool {
        self.0.get("auth_required").and_then(Value::as_bool) == Some(true)
            || self.error().is_some_and(|e| e.ends_with("_auth_required"))
    }

    pub fn auth_url(&self) -> Option<&str> {
        self.0.get("auth_url").and_then(Value::as_str)
    }

    /// Provider named by the result, or derived from an `<provider>_...` error code.
    pub fn provider(&self) -> Option<&str> {
        self.0
            .get("provider")
            .and_then(Value::as_str)
            .or_else(|| self.error().and_then(|e| e.strip_suffix("_auth_required")))
    }
}

impl From<Value> for ToolResult {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_mapping_is_wrapped() {
        let result = ToolResult::from_value(json!(["a", "b"]));
        assert_eq!(result.into_value(), json!({"result": ["a", "b"]}));
    }

    #[test]
    fn test_cacheability() {
        assert!(ToolResult::from_value(json!({"issues": [{"key": "A-1"}]})).is_cacheable());
        assert!(!ToolResult::from_value(json!({})).is_cacheable());
        assert!(!ToolResult::from_value(json!({"issues": [], "total": 0})).is_cacheable());
        assert!(!ToolResult::from_value(json!({"error": "x"})).is_cacheable());
        assert!(!ToolResult::from_value(json!({"error": null, "data": [1]})).is_cacheable());
        assert!(!ToolResult::from_value(json!("   ")).is_cacheable());
        assert!(!ToolResult::from_value(Value::Null).is_cacheable());
        assert!(ToolResult::from_value(json!("text")).is_cacheable());
    }

    #[test]
    fn test_auth_required() {
        let result = ToolResult::auth_required("slack", "https://auth", "authorize first");
        assert!(result.is_error());
        assert!(result.is_auth_required());
        assert_eq!(result.error(), Some("slack_auth_required"));
        assert_eq!(result.auth_url(), Some("https://auth"));
        assert_eq!(result.provider(), Some("slack"));
    }

    #[test]
    fn test_provider_from_error_code() {
        let result = ToolResult::from_value(json!({"error": "jira_auth_required", "auth_url": "u"}));
        assert!(result.is_auth_required());
        assert_eq!(result.provider(), Some("jira"));
    }

    #[test]
    fn test_upstream_carries_status() {
        let result = ToolResult::upstream("notion", Some(404), "object_not_found");
        assert_eq!(result.get("status"), Some(&json!(404)));
        assert_eq!(result.error(), Some("notion_api_error"));
        assert!(!result.is_auth_required());

        let result = ToolResult::upstream("notion", None, "connection reset");
        assert!(result.get("status").is_none());
    }

    #[test]
    fn test_failure_constructors_are_errors() {
        assert!(ToolResult::unsupported_tool("x").is_error());
        assert!(ToolResult::no_handler("x").is_error());
        assert!(ToolResult::timeout("x", 5).is_error());
        assert_eq!(
            ToolResult::invalid_argument("Missing required parameters: channel_id").error(),
            Some("Missing required parameters: channel_id")
        );
    }
}
