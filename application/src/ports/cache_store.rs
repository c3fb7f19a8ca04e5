//! Fast cache port
//!
//! String values with an optional time-to-live. The cache is a best-effort
//! accelerator: every reader must be correct on a miss.

use super::record_store::StoreError;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value`; `None` TTL means no expiry.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError>;
}
