//! OAuth provider port
//!
//! The identity collaborator of one provider: builds authorization URLs and
//! runs refresh-token grants. The authorization-code exchange happens outside
//! this system and writes token records directly.

use async_trait::async_trait;
use switchboard_domain::TokenGrant;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Token endpoint unreachable: {0}")]
    Transport(String),

    #[error("Token endpoint rejected the grant: {0}")]
    Rejected(String),

    #[error("Malformed token response: {0}")]
    InvalidResponse(String),

    #[error("OAuth client not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Provider identifier (e.g., "slack")
    fn provider(&self) -> &str;

    /// Authorization URL; `state` is echoed back to the callback so the
    /// grant can be attributed to the requesting user.
    fn authorize_url(&self, state: &str) -> String;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError>;
}
