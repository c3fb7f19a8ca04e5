//! Storage keys for integration data.

/// Seconds subtracted from a provider-reported lifetime.
pub const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Durable table holding one token record per app user.
pub fn integration_table(provider: &str) -> String {
    format!("{}_integration", provider)
}

/// Fast-mirror key for a token, by the provider's own user id.
pub fn token_mirror_key(provider: &str, provider_user_id: &str) -> String {
    format!("integration_token:{}:{}", provider, provider_user_id)
}

/// App user id → provider user id mapping key.
pub fn user_mapping_key(provider: &str, app_user_id: &str) -> String {
    format!("provider_user:{}:{}", provider, app_user_id)
}
