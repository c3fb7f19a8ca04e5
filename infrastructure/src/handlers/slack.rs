//! Slack handlers (messaging family)

use super::{missing_parameters, param_str, send};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;
use switchboard_application::{TokenStore, ToolHandler};
use switchboard_domain::query::extract_keywords;
use switchboard_domain::{Parameters, TokenLookup, ToolKind, ToolResult};
use tracing::debug;

const DEFAULT_HISTORY_LIMIT: u64 = 10;

/// Shared Slack Web API client.
pub struct SlackApi {
    client: Client,
    base: String,
    tokens: Arc<TokenStore>,
}

impl SlackApi {
    pub fn new(client: Client, base: &str, tokens: Arc<TokenStore>) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base, method)
    }

    /// The user's token, or the ready-made error result to return instead.
    async fn user_token(&self, params: &Parameters) -> Result<String, Value> {
        let Some(slack_user_id) = param_str(params, &["slack_user_id"]) else {
            return Err(json!({ "ok": false, "error": "missing_slack_user_id" }));
        };
        let app_user_id = param_str(params, &["app_user_id"]);

        match self
            .tokens
            .get_valid_token("slack", Some(slack_user_id), app_user_id)
            .await
        {
            TokenLookup::Valid(token) => Ok(token.access_token),
            TokenLookup::AuthRequired { auth_url, error } => {
                let message = error.unwrap_or_else(|| "Connect Slack to search your messages.".to_string());
                Err(ToolResult::auth_required("slack", &auth_url, message).into_value())
            }
        }
    }

    async fn search_messages(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["query"]) {
            return error;
        }
        let token = match self.user_token(params).await {
            Ok(token) => token,
            Err(result) => return result,
        };

        let query = extract_keywords(param_str(params, &["query"]).unwrap_or_default());
        debug!(tool = "slack_search_messages", "Search query: {}", query);

        send(
            "slack",
            self.client
                .get(self.method_url("search.messages"))
                .bearer_auth(token)
                .query(&[("query", query.as_str())]),
        )
        .await
    }

    async fn list_channels(&self, params: &Parameters) -> Value {
        let token = match self.user_token(params).await {
            Ok(token) => token,
            Err(result) => return result,
        };
        send(
            "slack",
            self.client
                .get(self.method_url("conversations.list"))
                .bearer_auth(token),
        )
        .await
    }

    async fn channel_messages(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["channel_id"]) {
            return error;
        }
        let token = match self.user_token(params).await {
            Ok(token) => token,
            Err(result) => return result,
        };

        let channel = param_str(params, &["channel_id"]).unwrap_or_default();
        let limit = history_limit(params);
        send(
            "slack",
            self.client
                .get(self.method_url("conversations.history"))
                .bearer_auth(token)
                .query(&[("channel", channel.to_string()), ("limit", limit.to_string())]),
        )
        .await
    }
}

fn history_limit(params: &Parameters) -> u64 {
    match params.get("limit") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|limit| *limit > 0)
    .unwrap_or(DEFAULT_HISTORY_LIMIT)
}

pub struct SlackHandler {
    kind: ToolKind,
    api: Arc<SlackApi>,
}

impl SlackHandler {
    pub fn new(kind: ToolKind, api: Arc<SlackApi>) -> Self {
        Self { kind, api }
    }
}

#[async_trait]
impl ToolHandler for SlackHandler {
    async fn call(&self, params: &Parameters) -> Value {
        match self.kind {
            ToolKind::SlackSearchMessages => self.api.search_messages(params).await,
            ToolKind::SlackListChannels => self.api.list_channels(params).await,
            ToolKind::SlackGetChannelMessages => self.api.channel_messages(params).await,
            other => ToolResult::no_handler(other.as_str()).into_value(),
        }
    }
}
