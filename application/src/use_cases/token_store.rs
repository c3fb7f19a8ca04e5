//! Token store: the only owner of integration token material.
//!
//! Durable records are the source of truth; the fast cache holds a mirror
//! keyed by the provider's own user id. Every write goes durable first, then
//! mirror, and always replaces the whole record.

use crate::config::PipelineParams;
use crate::ports::cache_store::CacheStore;
use crate::ports::oauth_provider::OAuthProvider;
use crate::ports::record_store::{Record, RecordStore, StoreError};
use chrono::Utc;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use switchboard_domain::integration::keys::{
    integration_table, token_mirror_key, user_mapping_key,
};
use switchboard_domain::{IntegrationStatus, IntegrationToken, TokenLookup};
use tracing::{debug, info, warn};

pub struct TokenStore {
    records: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheStore>,
    oauth: HashMap<String, Arc<dyn OAuthProvider>>,
    mirror_ttl: Duration,
}

/// Where a token record was found; decides which lookups a refresh repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Durable,
    Mirror,
}

impl TokenStore {
    pub fn new(
        records: Arc<dyn RecordStore>,
        cache: Arc<dyn CacheStore>,
        params: &PipelineParams,
    ) -> Self {
        Self {
            records,
            cache,
            oauth: HashMap::new(),
            mirror_ttl: params.token_mirror_ttl,
        }
    }

    /// Register the OAuth client for one provider.
    pub fn with_provider(mut self, client: Arc<dyn OAuthProvider>) -> Self {
        self.oauth.insert(client.provider().to_lowercase(), client);
        self
    }

    /// Authorization URL for `provider`, attributed to `state`.
    ///
    /// Empty when no OAuth client is registered for the provider.
    pub fn authorize_url(&self, provider: &str, state: &str) -> String {
        self.oauth
            .get(provider)
            .map(|client| client.authorize_url(state))
            .unwrap_or_default()
    }

    /// A usable access token, or an authorization URL.
    ///
    /// Resolution order: durable record (by app user id, else by provider
    /// user id), then the fast mirror by provider user id. An expired record
    /// with a refresh token is refreshed in place. Never fails: store errors
    /// are logged and treated as a missing record.
    pub async fn get_valid_token(
        &self,
        provider: &str,
        provider_user_id: Option<&str>,
        app_user_id: Option<&str>,
    ) -> TokenLookup {
        let provider_user_id = provider_user_id.filter(|id| !id.is_empty());
        let app_user_id = app_user_id.filter(|id| !id.is_empty());

        if let Some(token) = self.durable_record(provider, provider_user_id, app_user_id).await {
            return self.resolve(provider, token, Source::Durable, app_user_id).await;
        }

        if let Some(provider_user_id) = provider_user_id
            && let Some(token) = self.mirrored(provider, provider_user_id).await
        {
            return self.resolve(provider, token, Source::Mirror, app_user_id).await;
        }

        let state = app_user_id.or(provider_user_id).unwrap_or_default();
        self.auth_required(provider, state, None)
    }

    /// Persist a full token record: durable store first, then the mirror.
    pub async fn store_token(&self, provider: &str, token: &IntegrationToken) -> Result<(), StoreError> {
        self.records
            .upsert(&integration_table(provider), "user_id", token.to_record())
            .await?;
        self.mirror(provider, token).await;
        Ok(())
    }

    /// Remember which provider user an app user is.
    pub async fn store_user_mapping(
        &self,
        provider: &str,
        app_user_id: &str,
        provider_user_id: &str,
    ) -> Result<(), StoreError> {
        self.cache
            .set(
                &user_mapping_key(provider, app_user_id),
                provider_user_id.to_string(),
                None,
            )
            .await
    }

    /// The provider's user id for an app user.
    ///
    /// Reads the mapping cache, falling back to the durable token record and
    /// re-mirroring what it finds there.
    pub async fn provider_user_id(&self, provider: &str, app_user_id: &str) -> Option<String> {
        match self.cache.get(&user_mapping_key(provider, app_user_id)).await {
            Ok(Some(id)) if !id.is_empty() => return Some(id),
            Ok(_) => {}
            Err(e) => warn!("User mapping lookup failed for {}: {}", provider, e),
        }

        let token = self.durable_record(provider, None, Some(app_user_id)).await?;
        let id = token.provider_user_id?;
        if let Err(e) = self.store_user_mapping(provider, app_user_id, &id).await {
            warn!("Could not mirror user mapping for {}: {}", provider, e);
        }
        Some(id)
    }

    /// Connection status per provider for one app user.
    pub async fn integration_status(
        &self,
        app_user_id: &str,
        providers: &[String],
    ) -> BTreeMap<String, IntegrationStatus> {
        let now = Utc::now();
        let lookups = providers.iter().map(|provider| async move {
            let status = match self
                .records
                .select(&integration_table(provider), &[("user_id", app_user_id)])
                .await
            {
                Ok(rows) => match rows.first() {
                    Some(row) => match IntegrationToken::from_record(row) {
                        Ok(token) => IntegrationStatus::from_token(&token, now),
                        Err(e) => IntegrationStatus::failed(e.to_string()),
                    },
                    None => IntegrationStatus::disconnected(),
                },
                Err(e) => IntegrationStatus::failed(e.to_string()),
            };
            (provider.clone(), status)
        });
        join_all(lookups).await.into_iter().collect()
    }

    async fn resolve(
        &self,
        provider: &str,
        token: IntegrationToken,
        source: Source,
        app_user_id: Option<&str>,
    ) -> TokenLookup {
        if token.is_valid_at(Utc::now()) {
            return TokenLookup::Valid(token);
        }

        let state = app_user_id
            .or(token.provider_user_id.as_deref())
            .unwrap_or(token.user_id.as_str())
            .to_string();

        let Some(refresh_token) = token.refresh_token() else {
            debug!("Expired {} token without refresh token ({:?})", provider, source);
            return self.auth_required(provider, &state, None);
        };

        let Some(client) = self.oauth.get(provider) else {
            return self.auth_required(provider, &state, None);
        };

        match client.refresh(refresh_token).await {
            Ok(grant) => {
                let refreshed = token.refreshed(grant, Utc::now());
                if let Err(e) = self.store_token(provider, &refreshed).await {
                    warn!("Refreshed {} token could not be persisted: {}", provider, e);
                }
                info!("Refreshed {} token for user {} ({:?})", provider, refreshed.user_id, source);
                TokenLookup::Valid(refreshed)
            }
            Err(e) => {
                warn!("Token refresh failed for {}: {}", provider, e);
                self.auth_required(provider, &state, Some(e.to_string()))
            }
        }
    }

    fn auth_required(&self, provider: &str, state: &str, error: Option<String>) -> TokenLookup {
        let auth_url = self.authorize_url(provider, state);
        let error = match (error, auth_url.is_empty()) {
            (Some(e), _) => Some(e),
            (None, true) => Some(format!("No OAuth client configured for {}", provider)),
            (None, false) => None,
        };
        TokenLookup::AuthRequired { auth_url, error }
    }

    async fn durable_record(
        &self,
        provider: &str,
        provider_user_id: Option<&str>,
        app_user_id: Option<&str>,
    ) -> Option<IntegrationToken> {
        let filter = match (app_user_id, provider_user_id) {
            (Some(app), _) => ("user_id", app),
            (None, Some(native)) => ("provider_user_id", native),
            (None, None) => return None,
        };

        let rows = match self.records.select(&integration_table(provider), &[filter]).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Durable token lookup failed for {}: {}", provider, e);
                return None;
            }
        };
        rows.first().and_then(|row| parse_record(provider, row))
    }

    async fn mirrored(&self, provider: &str, provider_user_id: &str) -> Option<IntegrationToken> {
        let raw = match self.cache.get(&token_mirror_key(provider, provider_user_id)).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Token mirror lookup failed for {}: {}", provider, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Ignoring unreadable {} token mirror: {}", provider, e);
                None
            }
        }
    }

    async fn mirror(&self, provider: &str, token: &IntegrationToken) {
        let Some(provider_user_id) = token.provider_user_id.as_deref() else {
            return;
        };
        let raw = match serde_json::to_string(token) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not serialize {} token mirror: {}", provider, e);
                return;
            }
        };
        if let Err(e) = self
            .cache
            .set(&token_mirror_key(provider, provider_user_id), raw, Some(self.mirror_ttl))
            .await
        {
            warn!("Token mirror write failed for {}: {}", provider, e);
        }
    }
}

fn parse_record(provider: &str, row: &Record) -> Option<IntegrationToken> {
    match IntegrationToken::from_record(row) {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("Ignoring malformed {} token record: {}", provider, e);
            None
        }
    }
}
