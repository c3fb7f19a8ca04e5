//! Slack OAuth v2 client

use super::{transport_error, url_with_query};
use crate::config::FileSlackConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use switchboard_application::{OAuthError, OAuthProvider};
use switchboard_domain::TokenGrant;
use tracing::debug;

/// Lifetime assumed when Slack omits `expires_in` (rotating tokens last 12h).
const DEFAULT_EXPIRES_IN: i64 = 43_200;

pub struct SlackOAuth {
    client: Client,
    config: FileSlackConfig,
}

impl SlackOAuth {
    pub fn new(config: FileSlackConfig, timeout: Duration) -> Result<Self, OAuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self { client, config })
    }

    fn token_endpoint(&self) -> String {
        format!("{}/oauth.v2.access", self.config.api_base.trim_end_matches('/'))
    }
}

/// Parse an `oauth.v2.access` response.
///
/// User tokens live under `authed_user`; bot-only installs put the token at
/// the top level.
pub(crate) fn parse_grant(body: &Value) -> Result<TokenGrant, OAuthError> {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error");
        return Err(OAuthError::Rejected(error.to_string()));
    }

    let source = body
        .get("authed_user")
        .filter(|user| user.get("access_token").is_some())
        .unwrap_or(body);
    let text = |key: &str| {
        source
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let access_token = text("access_token")
        .ok_or_else(|| OAuthError::InvalidResponse("no access_token in grant".to_string()))?;

    Ok(TokenGrant {
        access_token,
        refresh_token: text("refresh_token"),
        expires_in: source
            .get("expires_in")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_EXPIRES_IN),
        scope: text("scope"),
        provider_user_id: text("id"),
    })
}

#[async_trait]
impl OAuthProvider for SlackOAuth {
    fn provider(&self) -> &str {
        "slack"
    }

    fn authorize_url(&self, state: &str) -> String {
        let (Some(client_id), Some(redirect_uri)) =
            (&self.config.client_id, &self.config.redirect_uri)
        else {
            return String::new();
        };
        url_with_query(
            &self.config.authorize_base,
            &[
                ("client_id", client_id.as_str()),
                ("scope", self.config.bot_scopes.as_str()),
                ("user_scope", self.config.user_scopes.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("state", state),
            ],
        )
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError> {
        let (Some(client_id), Some(client_secret)) =
            (&self.config.client_id, &self.config.client_secret)
        else {
            return Err(OAuthError::NotConfigured("slack".to_string()));
        };

        debug!("Refreshing Slack token");
        let body: Value = self
            .client
            .post(self.token_endpoint())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?
            .json()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;

        parse_grant(&body)
    }
}
