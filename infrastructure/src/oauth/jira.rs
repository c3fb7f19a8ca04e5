//! Atlassian (Jira Cloud) OAuth 2.0 (3LO) client

use super::{transport_error, url_with_query};
use crate::config::FileJiraConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use switchboard_application::{OAuthError, OAuthProvider};
use switchboard_domain::TokenGrant;
use tracing::debug;

const DEFAULT_EXPIRES_IN: i64 = 3_600;

pub struct JiraOAuth {
    client: Client,
    config: FileJiraConfig,
}

impl JiraOAuth {
    pub fn new(config: FileJiraConfig, timeout: Duration) -> Result<Self, OAuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self { client, config })
    }

    fn base(&self) -> &str {
        self.config.auth_base.trim_end_matches('/')
    }
}

/// Parse the token endpoint response. Atlassian reports failures with an
/// `error` field (and a non-2xx status).
pub(crate) fn parse_grant(success: bool, body: &Value) -> Result<TokenGrant, OAuthError> {
    let text = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if !success || body.get("error").is_some() {
        let error = text("error_description")
            .or_else(|| text("error"))
            .unwrap_or_else(|| "unknown_error".to_string());
        return Err(OAuthError::Rejected(error));
    }

    let access_token = text("access_token")
        .ok_or_else(|| OAuthError::InvalidResponse("no access_token in grant".to_string()))?;

    Ok(TokenGrant {
        access_token,
        refresh_token: text("refresh_token"),
        expires_in: body
            .get("expires_in")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_EXPIRES_IN),
        scope: text("scope"),
        provider_user_id: None,
    })
}

#[async_trait]
impl OAuthProvider for JiraOAuth {
    fn provider(&self) -> &str {
        "jira"
    }

    fn authorize_url(&self, state: &str) -> String {
        let (Some(client_id), Some(redirect_uri)) =
            (&self.config.client_id, &self.config.redirect_uri)
        else {
            return String::new();
        };
        url_with_query(
            &format!("{}/authorize", self.base()),
            &[
                ("audience", "api.atlassian.com"),
                ("client_id", client_id.as_str()),
                ("scope", self.config.scopes.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("state", state),
                ("response_type", "code"),
                ("prompt", "consent"),
            ],
        )
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError> {
        let (Some(client_id), Some(client_secret)) =
            (&self.config.client_id, &self.config.client_secret)
        else {
            return Err(OAuthError::NotConfigured("jira".to_string()));
        };

        debug!("Refreshing Jira token");
        let response = self
            .client
            .post(format!("{}/oauth/token", self.base()))
            .json(&json!({
                "grant_type": "refresh_token",
                "client_id": client_id,
                "client_secret": client_secret,
                "refresh_token": refresh_token,
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let success = response.status().is_success();
        let body: Value = response
            .json()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;
        parse_grant(success, &body)
    }
}
