//! Tool catalog: registry loading, provider detection and manifest building.
//!
//! Registry rows come from the durable store and are mirrored in the fast
//! cache. The catalog also keeps the last registry it managed to load, so a
//! store outage after startup degrades to slightly stale data instead of an
//! unusable system.

use crate::config::PipelineParams;
use crate::ports::cache_store::CacheStore;
use crate::ports::record_store::{RecordStore, StoreError};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use switchboard_domain::{ToolDescriptor, ToolRegistry};
use thiserror::Error;
use tracing::{debug, info, warn};

const REGISTRY_CACHE_KEY: &str = "context_registry:all";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No registry could be loaded and none was loaded before.
    #[error("Tool registry unavailable: {0}")]
    RegistryUnavailable(String),
}

pub struct ToolCatalog {
    records: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheStore>,
    table: String,
    registry_ttl: Duration,
    manifest_ttl: Duration,
    last_good: RwLock<Option<Arc<ToolRegistry>>>,
}

impl ToolCatalog {
    pub fn new(
        records: Arc<dyn RecordStore>,
        cache: Arc<dyn CacheStore>,
        params: &PipelineParams,
    ) -> Self {
        Self {
            records,
            cache,
            table: params.registry_table.clone(),
            registry_ttl: params.registry_ttl,
            manifest_ttl: params.manifest_ttl,
            last_good: RwLock::new(None),
        }
    }

    /// Startup load; failure here is fatal for the caller.
    pub async fn load(&self) -> Result<Arc<ToolRegistry>, CatalogError> {
        let registry = self.registry().await?;
        info!(
            "Tool registry loaded: {} tools, providers: {:?}",
            registry.len(),
            registry.providers()
        );
        Ok(registry)
    }

    /// Current registry: fast cache, then durable store, then last good snapshot.
    pub async fn registry(&self) -> Result<Arc<ToolRegistry>, CatalogError> {
        if let Some(rows) = self.cached_rows().await {
            return Ok(self.remember(build_registry(rows)));
        }

        match self.records.select(&self.table, &[]).await {
            Ok(rows) => {
                let rows: Vec<Value> = rows.into_iter().map(Value::Object).collect();
                self.cache_json(REGISTRY_CACHE_KEY, &rows, self.registry_ttl).await;
                Ok(self.remember(build_registry(rows)))
            }
            Err(e) => self.fallback(e),
        }
    }

    /// Sorted provider identifiers known to the registry.
    pub async fn providers(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.registry().await?.providers())
    }

    /// Providers literally named in the prompt.
    pub async fn detect_providers(&self, prompt: &str) -> Result<Vec<String>, CatalogError> {
        let detected = self.registry().await?.detect_providers(prompt);
        debug!("Detected providers: {:?}", detected);
        Ok(detected)
    }

    /// Enabled primary-search tools, restricted to `providers` when non-empty.
    pub async fn build_manifest(
        &self,
        user_id: Option<&str>,
        providers: &[String],
    ) -> Result<Vec<ToolDescriptor>, CatalogError> {
        let mut providers = providers.to_vec();
        providers.sort();
        providers.dedup();
        let key = manifest_key(user_id, &providers);

        if let Some(manifest) = self.cached::<Vec<ToolDescriptor>>(&key).await {
            debug!("Manifest cache hit: {}", key);
            return Ok(manifest);
        }

        let manifest = self.registry().await?.manifest(&providers);
        self.cache_json(&key, &manifest, self.manifest_ttl).await;
        Ok(manifest)
    }

    /// The full default tool set, never restricted by provider.
    pub async fn primary_search_tools(
        &self,
        _user_id: Option<&str>,
    ) -> Result<Vec<ToolDescriptor>, CatalogError> {
        Ok(self.registry().await?.primary_search_tools())
    }

    fn remember(&self, registry: ToolRegistry) -> Arc<ToolRegistry> {
        let registry = Arc::new(registry);
        if let Ok(mut slot) = self.last_good.write() {
            *slot = Some(registry.clone());
        }
        registry
    }

    fn fallback(&self, error: StoreError) -> Result<Arc<ToolRegistry>, CatalogError> {
        let snapshot = self.last_good.read().ok().and_then(|slot| slot.clone());
        match snapshot {
            Some(registry) => {
                warn!("Registry refresh failed, serving last loaded registry: {}", error);
                Ok(registry)
            }
            None => Err(CatalogError::RegistryUnavailable(error.to_string())),
        }
    }

    async fn cached_rows(&self) -> Option<Vec<Value>> {
        self.cached::<Vec<Value>>(REGISTRY_CACHE_KEY).await
    }

    async fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring unreadable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn cache_json<T: serde::Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not serialize cache entry {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.cache.set(key, raw, Some(ttl)).await {
            warn!("Cache write failed for {}: {}", key, e);
        }
    }
}

/// `tool_manifest:<user|default>:<sorted providers joined by '-' | all>`
fn manifest_key(user_id: Option<&str>, sorted_providers: &[String]) -> String {
    let providers = if sorted_providers.is_empty() {
        "all".to_string()
    } else {
        sorted_providers.join("-")
    };
    format!(
        "tool_manifest:{}:{}",
        user_id.filter(|u| !u.is_empty()).unwrap_or("default"),
        providers
    )
}

fn build_registry(rows: Vec<Value>) -> ToolRegistry {
    let descriptors = rows
        .into_iter()
        .filter_map(|row| match ToolDescriptor::from_record(row) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                warn!("Skipping registry row: {}", e);
                None
            }
        });
    ToolRegistry::from_descriptors(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryCache, MemoryRecords, registry_rows};
    use std::sync::atomic::Ordering;

    fn catalog() -> (ToolCatalog, Arc<MemoryRecords>, Arc<MemoryCache>) {
        let records = Arc::new(MemoryRecords::new().with_rows("context_registry", registry_rows()));
        let cache = Arc::new(MemoryCache::new());
        let catalog = ToolCatalog::new(records.clone(), cache.clone(), &PipelineParams::default());
        (catalog, records, cache)
    }

    fn names(tools: &[ToolDescriptor]) -> Vec<&str> {
        tools.iter().map(|t| t.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_manifest_filtering() {
        let (catalog, _, _) = catalog();

        let jira = catalog.build_manifest(Some("u1"), &["jira".to_string()]).await.unwrap();
        assert_eq!(names(&jira), vec!["jira_search_issues"]);

        let all = catalog.build_manifest(Some("u1"), &[]).await.unwrap();
        assert_eq!(
            names(&all),
            vec!["slack_search_messages", "jira_search_issues", "notion_search"]
        );
    }

    #[tokio::test]
    async fn test_manifest_cache_key_uses_sorted_providers() {
        let (catalog, _, cache) = catalog();
        catalog
            .build_manifest(None, &["slack".to_string(), "jira".to_string()])
            .await
            .unwrap();
        catalog.build_manifest(Some("u1"), &[]).await.unwrap();

        assert!(cache.peek("tool_manifest:default:jira-slack").is_some());
        assert!(cache.peek("tool_manifest:u1:all").is_some());
    }

    #[tokio::test]
    async fn test_cached_manifest_equals_recomputed() {
        let (catalog, _, _) = catalog();
        let providers = ["notion".to_string()];
        let first = catalog.build_manifest(Some("u1"), &providers).await.unwrap();
        let second = catalog.build_manifest(Some("u1"), &providers).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_registry_is_cached() {
        let (catalog, records, cache) = catalog();
        catalog.registry().await.unwrap();
        catalog.registry().await.unwrap();
        assert_eq!(records.selects.load(Ordering::SeqCst), 1);
        assert!(cache.peek(REGISTRY_CACHE_KEY).is_some());
    }

    #[tokio::test]
    async fn test_detect_providers() {
        let (catalog, _, _) = catalog();
        assert_eq!(
            catalog.detect_providers("show me the jira tickets").await.unwrap(),
            vec!["jira"]
        );
        assert!(catalog.detect_providers("hello").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_load_failure_is_fatal() {
        let (catalog, records, _) = catalog();
        records.fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            catalog.load().await,
            Err(CatalogError::RegistryUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_later_failure_serves_snapshot() {
        let records = Arc::new(MemoryRecords::new().with_rows("context_registry", registry_rows()));
        // Fresh cache per call so every lookup reaches the store
        let catalog = ToolCatalog::new(
            records.clone(),
            Arc::new(NoCache),
            &PipelineParams::default(),
        );
        catalog.load().await.unwrap();

        records.fail.store(true, Ordering::SeqCst);
        let registry = catalog.registry().await.unwrap();
        assert!(registry.contains("jira_search_issues"));
    }

    struct NoCache;

    #[async_trait::async_trait]
    impl CacheStore for NoCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> Result<(), StoreError> {
            Err(StoreError::Connection("cache offline".into()))
        }
    }

    #[tokio::test]
    async fn test_bad_rows_are_skipped() {
        let records = Arc::new(MemoryRecords::new().with_rows(
            "context_registry",
            vec![
                serde_json::json!({"description": "nameless"}),
                serde_json::json!({"name": "notion_search", "provider": "notion", "primary_search": true}),
            ],
        ));
        let catalog = ToolCatalog::new(records, Arc::new(MemoryCache::new()), &PipelineParams::default());
        assert_eq!(catalog.load().await.unwrap().len(), 1);
    }
}
