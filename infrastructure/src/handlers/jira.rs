//! Jira Cloud handlers (issue-tracker family)
//!
//! Every call resolves the caller's token and cloud id from the app user id.
//! Requests go through the Atlassian API gateway:
//! `<api_base>/ex/jira/<cloud_id>/rest/api/3/...`.

use super::{missing_parameters, param_str, send};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use std::sync::Arc;
use switchboard_application::{TokenStore, ToolHandler};
use switchboard_domain::{Parameters, TokenLookup, ToolKind, ToolResult};

/// Credentials for one Jira site.
#[derive(Debug, Clone, PartialEq, Eq)]
struct JiraSite {
    access_token: String,
    cloud_id: String,
}

pub struct JiraApi {
    client: Client,
    base: String,
    tokens: Arc<TokenStore>,
}

impl JiraApi {
    pub fn new(client: Client, base: &str, tokens: Arc<TokenStore>) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn rest_url(&self, cloud_id: &str, path: &str) -> String {
        format!("{}/ex/jira/{}/rest/api/3/{}", self.base, cloud_id, path)
    }

    /// Explicit `access_token` + `cloud_id` parameters win; otherwise both
    /// come from the user's token record.
    async fn site(&self, params: &Parameters) -> Result<JiraSite, Value> {
        if let (Some(access_token), Some(cloud_id)) = (
            param_str(params, &["access_token"]),
            param_str(params, &["cloud_id"]),
        ) {
            return Ok(JiraSite {
                access_token: access_token.to_string(),
                cloud_id: cloud_id.to_string(),
            });
        }

        let Some(user_id) = param_str(params, &["user_id"]) else {
            let error = missing_parameters(params, &["cloud_id", "access_token", "user_id"])
                .unwrap_or_else(|| json!({ "error": "Missing required parameters: user_id" }));
            return Err(error);
        };

        match self.tokens.get_valid_token("jira", None, Some(user_id)).await {
            TokenLookup::Valid(token) => match token.resource_id {
                Some(cloud_id) => Ok(JiraSite {
                    access_token: token.access_token,
                    cloud_id,
                }),
                None => Err(ToolResult::invalid_argument(
                    "Missing required parameters: cloud_id",
                )
                .into_value()),
            },
            TokenLookup::AuthRequired { auth_url, error } => {
                let message = error.unwrap_or_else(|| "Connect Jira to search your issues.".to_string());
                Err(ToolResult::auth_required("jira", &auth_url, message).into_value())
            }
        }
    }

    async fn request(&self, method: Method, params: &Parameters, path: &str, body: Option<Value>) -> Value {
        let site = match self.site(params).await {
            Ok(site) => site,
            Err(result) => return result,
        };

        let mut request = self
            .client
            .request(method, self.rest_url(&site.cloud_id, path))
            .bearer_auth(&site.access_token)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }
        send("jira", request).await
    }

    async fn search(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["jql"]) {
            return error;
        }
        let jql = param_str(params, &["jql"]).unwrap_or_default();
        let site = match self.site(params).await {
            Ok(site) => site,
            Err(result) => return result,
        };

        send(
            "jira",
            self.client
                .get(self.rest_url(&site.cloud_id, "search"))
                .bearer_auth(&site.access_token)
                .header("Accept", "application/json")
                .query(&[("jql", jql)]),
        )
        .await
    }

    async fn get_issue(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["issue_id/issue_key"]) {
            return error;
        }
        let issue = issue_ref(params);
        self.request(Method::GET, params, &format!("issue/{}", issue), None)
            .await
    }

    async fn create_issue(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["fields"]) {
            return error;
        }
        let body = json!({ "fields": params.get("fields") });
        self.request(Method::POST, params, "issue", Some(body)).await
    }

    async fn add_comment(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["issue_id/issue_key", "comment"]) {
            return error;
        }
        let issue = issue_ref(params);
        let body = json!({ "body": comment_body(params.get("comment")) });
        self.request(Method::POST, params, &format!("issue/{}/comment", issue), Some(body))
            .await
    }

    async fn update_issue(&self, params: &Parameters) -> Value {
        if let Some(error) = missing_parameters(params, &["issue_id/issue_key", "fields"]) {
            return error;
        }
        let issue = issue_ref(params);
        let body = json!({ "fields": params.get("fields") });
        self.request(Method::PUT, params, &format!("issue/{}", issue), Some(body))
            .await
    }
}

fn issue_ref(params: &Parameters) -> String {
    param_str(params, &["issue_id", "issue_key"])
        .unwrap_or_default()
        .to_string()
}

/// REST v3 wants Atlassian Document Format; plain strings are wrapped in a
/// single paragraph, anything else is passed through.
fn comment_body(comment: Option<&Value>) -> Value {
    match comment {
        Some(Value::String(text)) => json!({
            "type": "doc",
            "version": 1,
            "content": [{
                "type": "paragraph",
                "content": [{ "type": "text", "text": text }]
            }]
        }),
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

pub struct JiraHandler {
    kind: ToolKind,
    api: Arc<JiraApi>,
}

impl JiraHandler {
    pub fn new(kind: ToolKind, api: Arc<JiraApi>) -> Self {
        Self { kind, api }
    }
}

#[async_trait]
impl ToolHandler for JiraHandler {
    async fn call(&self, params: &Parameters) -> Value {
        match self.kind {
            ToolKind::JiraSearchIssues => self.api.search(params).await,
            ToolKind::JiraGetIssue => self.api.get_issue(params).await,
            ToolKind::JiraCreateIssue => self.api.create_issue(params).await,
            ToolKind::JiraAddComment => self.api.add_comment(params).await,
            ToolKind::JiraUpdateIssue => self.api.update_issue(params).await,
            other => ToolResult::no_handler(other.as_str()).into_value(),
        }
    }
}
