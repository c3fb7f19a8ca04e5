//! Durable record store port
//!
//! Key-value-by-table semantics over the system's database: the tool registry
//! table and one integration table per provider.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// One table row.
pub type Record = Map<String, Value>;

/// Errors from the durable store and the fast cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows of `table` whose columns equal every `(column, value)` in `filter`.
    async fn select(&self, table: &str, filter: &[(&str, &str)]) -> Result<Vec<Record>, StoreError>;

    /// Insert `row`, or replace the row with the same `key_column` value.
    ///
    /// The replacement is whole-row: readers never see a mix of old and new
    /// columns.
    async fn upsert(&self, table: &str, key_column: &str, row: Record) -> Result<(), StoreError>;
}
