//! In-memory fast cache with per-entry expiry.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use switchboard_application::{CacheStore, StoreError};
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Minimum time between two sweeps triggered from `set`.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Best-effort cache shared by every request in the process.
///
/// Expired entries are dropped lazily on read, and a write sweeps the whole
/// map at most once per sweep interval, so keys that are never read
/// again do not accumulate.
#[derive(Debug)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
    origin: Instant,
    /// Milliseconds after `origin` of the last sweep
    last_sweep: AtomicU64,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            origin: Instant::now(),
            last_sweep: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Sweep if the last sweep is older than the interval. Only the
    /// caller that wins the timestamp swap does the work.
    fn maybe_sweep(&self, now: Instant) {
        let elapsed = u64::try_from(now.duration_since(self.origin).as_millis()).unwrap_or(u64::MAX);
        let last = self.last_sweep.load(Ordering::Relaxed);
        if elapsed.saturating_sub(last) < SWEEP_INTERVAL.as_millis() as u64 {
            return;
        }
        if self
            .last_sweep
            .compare_exchange(last, elapsed, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            let removed = self.purge_expired();
            if removed > 0 {
                debug!(removed, remaining = self.entries.len(), "Swept expired cache entries");
            }
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let value = self
            .entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));

        match value {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                self.entries.remove_if(key, |_, entry| !entry.is_live(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError> {
        let now = Instant::now();
        let expires_at = ttl.map(|ttl| now + ttl);
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
        self.maybe_sweep(now);
        Ok(())
    }
}
