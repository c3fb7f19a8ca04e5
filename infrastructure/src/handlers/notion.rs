//! Notion handlers (document family)
//!
//! Notion uses one workspace integration token from configuration rather
//! than per-user OAuth.

use super::{missing_parameters, param_str, send};
use crate::config::FileNotionConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use switchboard_application::ToolHandler;
use switchboard_domain::{Parameters, ToolKind, ToolResult};
use tracing::warn;

pub struct NotionApi {
    client: Client,
    base: String,
    version: String,
    token: Option<String>,
}

impl NotionApi {
    pub fn new(client: Client, config: &FileNotionConfig) -> Self {
        let token = config.resolve_token();
        if token.is_none() {
            warn!(
                "No Notion integration token (set providers.notion.token or {})",
                config.token_env
            );
        }
        Self {
            client,
            base: config.api_base.trim_end_matches('/').to_string(),
            version: config.api_version.clone(),
            token,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, Value> {
        let token = self.token.as_deref().ok_or_else(|| {
            ToolResult::invalid_argument("Notion integration token is not configured").into_value()
        })?;
        Ok(request
            .bearer_auth(token)
            .header("Notion-Version", &self.version))
    }

    async fn search(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["query"]) {
            return error;
        }
        let body = search_body(params);
        match self.authorized(self.client.post(format!("{}/search", self.base))) {
            Ok(request) => send("notion", request.json(&body)).await,
            Err(error) => error,
        }
    }

    async fn query_database(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["database_id"]) {
            return error;
        }
        let database_id = param_str(params, &["database_id"]).unwrap_or_default();
        let url = format!("{}/databases/{}/query", self.base, database_id);
        let body = pick(params, &["filter", "sorts"]);
        match self.authorized(self.client.post(url)) {
            Ok(request) => send("notion", request.json(&body)).await,
            Err(error) => error,
        }
    }

    async fn retrieve_page(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["page_id"]) {
            return error;
        }
        let page_id = param_str(params, &["page_id"]).unwrap_or_default();
        let url = format!("{}/pages/{}", self.base, page_id);
        match self.authorized(self.client.get(url)) {
            Ok(request) => send("notion", request).await,
            Err(error) => error,
        }
    }
}

fn search_body(params: &Parameters) -> Value {
    let mut body = pick(params, &["filter"]);
    if let (Value::Object(map), Some(query)) = (&mut body, param_str(params, &["query"])) {
        map.insert("query".to_string(), json!(query));
    }
    body
}

/// Copy the listed, non-null parameters into a request body.
fn pick(params: &Parameters, keys: &[&str]) -> Value {
    let body: Map<String, Value> = keys
        .iter()
        .filter_map(|key| {
            params
                .get(*key)
                .filter(|value| !value.is_null())
                .map(|value| (key.to_string(), value.clone()))
        })
        .collect();
    Value::Object(body)
}

pub struct NotionHandler {
    kind: ToolKind,
    api: Arc<NotionApi>,
}

impl NotionHandler {
    pub fn new(kind: ToolKind, api: Arc<NotionApi>) -> Self {
        Self { kind, api }
    }
}

#[async_trait]
impl ToolHandler for NotionHandler {
    async fn call(&self, params: &Parameters) -> Value {
        match self.kind {
            ToolKind::NotionSearch => self.api.search(params).await,
            ToolKind::NotionQueryDatabase => self.api.query_database(params).await,
            ToolKind::NotionRetrievePage => self.api.retrieve_page(params).await,
            other => ToolResult::no_handler(other.as_str()).into_value(),
        }
    }
}
