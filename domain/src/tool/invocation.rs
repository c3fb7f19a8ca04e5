//! Prepared tool invocations.
//!
//! A [`ToolCall`] coming from tool selection carries loose parameters. Before
//! dispatch it is turned into a [`PreparedCall`], one variant per tool family,
//! with the cross-cutting parameters injected. The prepared call is lowered
//! back to a wire [`ToolCall`] for caching and for the handler.

use super::entities::{Parameters, ToolCall};
use super::kind::{ToolFamily, ToolKind};
use crate::query::prompt_to_jql;
use serde_json::{Map, Value};

/// Request-scoped values available for injection.
#[derive(Debug, Clone, Copy)]
pub struct InjectionContext<'a> {
    pub prompt: &'a str,
    pub app_user_id: &'a str,
    /// Messaging-provider user id mapped from `app_user_id`, if any
    pub messaging_user_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreparedCall {
    Messaging {
        kind: ToolKind,
        provider_user_id: String,
        app_user_id: String,
        params: Parameters,
    },
    IssueTracker {
        kind: ToolKind,
        user_id: String,
        params: Parameters,
    },
    Document {
        kind: ToolKind,
        params: Parameters,
    },
}

/// Outcome of preparing a call.
#[derive(Debug, Clone, PartialEq)]
pub enum Preparation {
    Ready(PreparedCall),
    /// The family needs a user mapping that does not exist yet.
    NeedsAuthorization { provider: &'static str },
}

impl PreparedCall {
    pub fn prepare(kind: ToolKind, mut params: Parameters, ctx: &InjectionContext<'_>) -> Preparation {
        match kind.family() {
            ToolFamily::Messaging => {
                let Some(provider_user_id) = ctx.messaging_user_id else {
                    return Preparation::NeedsAuthorization { provider: "slack" };
                };
                backfill_query(&mut params, ctx.prompt);
                Preparation::Ready(PreparedCall::Messaging {
                    kind,
                    provider_user_id: provider_user_id.to_string(),
                    app_user_id: ctx.app_user_id.to_string(),
                    params,
                })
            }
            ToolFamily::IssueTracker => {
                if kind.is_family_search() && !params.contains_key("jql") {
                    params.insert("jql".to_string(), Value::String(prompt_to_jql(ctx.prompt)));
                }
                Preparation::Ready(PreparedCall::IssueTracker {
                    kind,
                    user_id: ctx.app_user_id.to_string(),
                    params,
                })
            }
            ToolFamily::Document | ToolFamily::Other => {
                backfill_query(&mut params, ctx.prompt);
                Preparation::Ready(PreparedCall::Document { kind, params })
            }
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            PreparedCall::Messaging { kind, .. }
            | PreparedCall::IssueTracker { kind, .. }
            | PreparedCall::Document { kind, .. } => *kind,
        }
    }

    /// Lower to the wire shape handed to handlers and used for cache keys.
    pub fn into_call(self) -> ToolCall {
        let kind = self.kind();
        let params = match self {
            PreparedCall::Messaging {
                provider_user_id,
                app_user_id,
                mut params,
                ..
            } => {
                params.insert("slack_user_id".to_string(), Value::String(provider_user_id));
                params.insert("app_user_id".to_string(), Value::String(app_user_id));
                params
            }
            PreparedCall::IssueTracker {
                user_id,
                mut params,
                ..
            } => {
                params.insert("user_id".to_string(), Value::String(user_id));
                params
            }
            PreparedCall::Document { params, .. } => params,
        };
        ToolCall::new(kind.as_str()).with_parameters(params)
    }
}

fn backfill_query(params: &mut Parameters, prompt: &str) {
    if !params.contains_key("query") {
        params.insert("query".to_string(), Value::String(prompt.to_string()));
    }
}

/// Cache key: `tool_call:<name>:<canonical parameters>`.
///
/// Object keys are sorted at every depth so equal parameter maps always
/// produce the same key.
pub fn cache_key(call: &ToolCall) -> String {
    let canonical = canonicalize(&Value::Object(call.parameters.clone()));
    format!("tool_call:{}:{}", call.name, canonical)
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(messaging_user_id: Option<&str>) -> InjectionContext<'_> {
        InjectionContext {
            prompt: "find tickets about onboarding in project ABC",
            app_user_id: "user-1",
            messaging_user_id,
        }
    }

    #[test]
    fn test_messaging_requires_mapping() {
        let prepared = PreparedCall::prepare(ToolKind::SlackSearchMessages, Parameters::new(), &ctx(None));
        assert_eq!(prepared, Preparation::NeedsAuthorization { provider: "slack" });
    }

    #[test]
    fn test_messaging_injection() {
        let Preparation::Ready(prepared) =
            PreparedCall::prepare(ToolKind::SlackSearchMessages, Parameters::new(), &ctx(Some("U42")))
        else {
            panic!("expected ready");
        };
        let call = prepared.into_call();
        assert_eq!(call.name, "slack_search_messages");
        assert_eq!(call.get_str("slack_user_id"), Some("U42"));
        assert_eq!(call.get_str("app_user_id"), Some("user-1"));
        assert_eq!(
            call.get_str("query"),
            Some("find tickets about onboarding in project ABC")
        );
    }

    #[test]
    fn test_issue_search_gets_jql_and_user_id() {
        let Preparation::Ready(prepared) =
            PreparedCall::prepare(ToolKind::JiraSearchIssues, Parameters::new(), &ctx(None))
        else {
            panic!("expected ready");
        };
        let call = prepared.into_call();
        assert_eq!(call.get_str("user_id"), Some("user-1"));
        let jql = call.get_str("jql").unwrap();
        assert!(jql.contains(r#"project = "ABC""#));
        assert!(jql.contains(r#"text ~ "onboarding""#));
        assert!(!call.has_param("query"));
    }

    #[test]
    fn test_explicit_jql_is_kept() {
        let mut params = Parameters::new();
        params.insert("jql".to_string(), json!("key = A-1"));
        let Preparation::Ready(prepared) =
            PreparedCall::prepare(ToolKind::JiraSearchIssues, params, &ctx(None))
        else {
            panic!("expected ready");
        };
        assert_eq!(prepared.into_call().get_str("jql"), Some("key = A-1"));
    }

    #[test]
    fn test_issue_tracker_user_id_overrides_supplied_value() {
        let mut params = Parameters::new();
        params.insert("user_id".to_string(), json!("someone-else"));
        let Preparation::Ready(prepared) =
            PreparedCall::prepare(ToolKind::JiraGetIssue, params, &ctx(None))
        else {
            panic!("expected ready");
        };
        let call = prepared.into_call();
        assert_eq!(call.get_str("user_id"), Some("user-1"));
        assert!(!call.has_param("jql"));
    }

    #[test]
    fn test_document_query_backfill_keeps_existing() {
        let mut params = Parameters::new();
        params.insert("query".to_string(), json!("roadmap"));
        let Preparation::Ready(prepared) =
            PreparedCall::prepare(ToolKind::NotionSearch, params, &ctx(None))
        else {
            panic!("expected ready");
        };
        assert_eq!(prepared.into_call().get_str("query"), Some("roadmap"));
    }

    #[test]
    fn test_cache_key_is_order_independent() {
        let a = ToolCall::new("notion_search")
            .with_param("query", "x")
            .with_param("filter", json!({"b": 1, "a": [{"z": 1, "y": 2}]}));
        let b = ToolCall::new("notion_search")
            .with_param("filter", json!({"a": [{"y": 2, "z": 1}], "b": 1}))
            .with_param("query", "x");
        assert_eq!(cache_key(&a), cache_key(&b));
        assert!(cache_key(&a).starts_with("tool_call:notion_search:{"));
        assert_ne!(cache_key(&a), cache_key(&a.clone().with_param("query", "y")));
    }
}
