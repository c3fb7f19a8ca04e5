//! Process-local durable store.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use switchboard_application::{Record, RecordStore, StoreError};
use tokio::sync::RwLock;
use tracing::info;

/// Tables held in memory for the lifetime of the process.
///
/// Useful for local runs and tests; a seed file provides the tool registry
/// and any pre-authorized token records.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{"<table>": [row, ...], ...}` from a JSON file.
    pub fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Connection(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        let store = Self::from_seed(&raw)?;
        info!("Loaded store seed from {}", path.display());
        Ok(store)
    }

    pub fn from_seed(raw: &str) -> Result<Self, StoreError> {
        let seed: HashMap<String, Vec<Value>> =
            serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut tables = HashMap::new();
        for (table, rows) in seed {
            let rows = rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(map) => Ok(map),
                    other => Err(StoreError::Serialization(format!(
                        "row in table '{}' is not an object: {}",
                        table, other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            tables.insert(table, rows);
        }
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    pub async fn table_len(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, Vec::len)
    }
}

fn matches(row: &Record, filter: &[(&str, &str)]) -> bool {
    filter.iter().all(|(column, expected)| match row.get(*column) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == *expected,
        Some(Value::Bool(b)) => b.to_string() == *expected,
        _ => false,
    })
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select(&self, table: &str, filter: &[(&str, &str)]) -> Result<Vec<Record>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches(row, filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, table: &str, key_column: &str, row: Record) -> Result<(), StoreError> {
        let key = row
            .get(key_column)
            .cloned()
            .ok_or_else(|| StoreError::Query(format!("row has no '{}' column", key_column)))?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|existing| existing.get(key_column) == Some(&key)) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn row(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_select_with_filter() {
        let store = InMemoryRecordStore::from_seed(
            r#"{"slack_integration": [
                {"user_id": "a", "provider_user_id": "U1"},
                {"user_id": "b", "provider_user_id": "U2"}
            ]}"#,
        )
        .unwrap();

        let rows = store.select("slack_integration", &[("user_id", "b")]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["provider_user_id"], "U2");
        assert_eq!(store.select("slack_integration", &[]).await.unwrap().len(), 2);
        assert!(store.select("missing", &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_row() {
        let store = InMemoryRecordStore::new();
        store
            .upsert("jira_integration", "user_id", row(json!({"user_id": "a", "access_token": "t1", "scope": "read"})))
            .await
            .unwrap();
        store
            .upsert("jira_integration", "user_id", row(json!({"user_id": "a", "access_token": "t2"})))
            .await
            .unwrap();

        let rows = store.select("jira_integration", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["access_token"], "t2");
        assert!(!rows[0].contains_key("scope"));
    }

    #[tokio::test]
    async fn test_upsert_requires_key_column() {
        let store = InMemoryRecordStore::new();
        let err = store
            .upsert("t", "user_id", row(json!({"access_token": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"context_registry": [{{"name": "notion_search", "provider": "notion"}}]}}"#).unwrap();

        let store = InMemoryRecordStore::from_seed_file(file.path()).unwrap();
        assert_eq!(store.table_len("context_registry").await, 1);
    }

    #[tokio::test]
    async fn test_bundled_registry_seed() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/registry_seed.json");
        let store = InMemoryRecordStore::from_seed_file(&path).unwrap();

        let rows = store.select("context_registry", &[]).await.unwrap();
        assert_eq!(rows.len(), 11);
        for row in rows {
            let descriptor =
                switchboard_domain::ToolDescriptor::from_record(Value::Object(row)).unwrap();
            assert!(descriptor.name.parse::<switchboard_domain::ToolKind>().is_ok());
        }
    }

    #[test]
    fn test_bad_seed_is_rejected() {
        assert!(matches!(
            InMemoryRecordStore::from_seed(r#"{"t": [1, 2]}"#),
            Err(StoreError::Serialization(_))
        ));
        assert!(InMemoryRecordStore::from_seed("not json").is_err());
    }
}
