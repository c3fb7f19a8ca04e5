//! Provider tool handlers
//!
//! One handler per [`ToolKind`], grouped by provider family. Handlers never
//! return `Err`: transport failures, non-2xx answers, missing arguments and
//! missing authorization all come back as `{error, ...}` values.

pub mod jira;
pub mod notion;
pub mod slack;

pub use jira::JiraHandler;
pub use notion::NotionHandler;
pub use slack::SlackHandler;

use crate::config::FileProvidersConfig;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use switchboard_application::{HandlerTable, TokenStore};
use switchboard_domain::core::string::{is_falsy, truncate};
use switchboard_domain::{Parameters, ToolFamily, ToolKind, ToolResult};
use tracing::debug;

/// Longest provider error body kept in a result.
const MAX_ERROR_DETAILS: usize = 500;

/// Build the handler for every tool kind.
pub fn build_handler_table(
    providers: &FileProvidersConfig,
    tokens: Arc<TokenStore>,
    request_timeout: Duration,
) -> Result<HandlerTable, reqwest::Error> {
    let client = Client::builder().timeout(request_timeout).build()?;

    let slack = Arc::new(slack::SlackApi::new(
        client.clone(),
        &providers.slack.api_base,
        Arc::clone(&tokens),
    ));
    let jira = Arc::new(jira::JiraApi::new(
        client.clone(),
        &providers.jira.api_base,
        tokens,
    ));
    let notion = Arc::new(notion::NotionApi::new(client, &providers.notion));

    let table = ToolKind::ALL
        .into_iter()
        .fold(HandlerTable::new(), |table, kind| match kind.family() {
            ToolFamily::Messaging => {
                table.register(kind, Arc::new(SlackHandler::new(kind, Arc::clone(&slack))))
            }
            ToolFamily::IssueTracker => {
                table.register(kind, Arc::new(JiraHandler::new(kind, Arc::clone(&jira))))
            }
            ToolFamily::Document => {
                table.register(kind, Arc::new(NotionHandler::new(kind, Arc::clone(&notion))))
            }
            ToolFamily::Other => table,
        });

    debug!("Registered {} tool handlers", table.len());
    Ok(table)
}

/// Send a provider request and normalize the answer.
///
/// Non-2xx becomes an upstream error carrying the status and body; an empty
/// success body (e.g. `204 No Content`) becomes `{ok: true, status}`.
pub(crate) async fn send(provider: &str, request: RequestBuilder) -> Value {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return ToolResult::upstream(provider, None, e.to_string()).into_value(),
    };

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return ToolResult::upstream(provider, Some(status.as_u16()), truncate(&body, MAX_ERROR_DETAILS))
            .into_value();
    }
    if body.trim().is_empty() {
        return json!({ "ok": true, "status": status.as_u16() });
    }
    serde_json::from_str(&body).unwrap_or_else(|_| json!({ "result": body }))
}

/// First present, non-empty string among `keys`.
pub(crate) fn param_str<'a>(params: &'a Parameters, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| params.get(*key).and_then(Value::as_str))
        .find(|value| !value.trim().is_empty())
}

/// `{error: "Missing required parameters: a, b"}` when any named parameter is
/// absent or falsy. Alternatives are written `a/b`.
pub(crate) fn missing_parameters(params: &Parameters, required: &[&str]) -> Option<Value> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|names| {
            !names
                .split('/')
                .any(|key| params.get(key).is_some_and(|value| !is_falsy(value)))
        })
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(
            ToolResult::invalid_argument(format!(
                "Missing required parameters: {}",
                missing.join(", ")
            ))
            .into_value(),
        )
    }
}
