//! PostgREST-backed durable store (Supabase).

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use switchboard_application::{Record, RecordStore, StoreError};
use tracing::debug;

pub struct SupabaseRecordStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseRecordStore {
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        Url::parse(&format!("{}/rest/v1/{}", self.base_url, table))
            .map_err(|e| StoreError::Connection(format!("bad store url: {}", e)))
    }

    /// `GET /rest/v1/<table>?select=*&<col>=eq.<value>...`
    pub(crate) fn select_url(&self, table: &str, filter: &[(&str, &str)]) -> Result<Url, StoreError> {
        let mut url = self.table_url(table)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            for (column, value) in filter {
                query.append_pair(column, &format!("eq.{}", value));
            }
        }
        Ok(url)
    }

    /// `POST /rest/v1/<table>?on_conflict=<key>`
    pub(crate) fn upsert_url(&self, table: &str, key_column: &str) -> Result<Url, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("on_conflict", key_column);
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

fn check_status(status: StatusCode, body: &str) -> Result<(), StoreError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(StoreError::Query(format!(
            "HTTP {}: {}",
            status.as_u16(),
            switchboard_domain::core::string::truncate(body, 300)
        )))
    }
}

fn parse_rows(body: &str) -> Result<Vec<Record>, StoreError> {
    let rows: Vec<Value> =
        serde_json::from_str(body).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect())
}

#[async_trait]
impl RecordStore for SupabaseRecordStore {
    async fn select(&self, table: &str, filter: &[(&str, &str)]) -> Result<Vec<Record>, StoreError> {
        let url = self.select_url(table, filter)?;
        debug!("Store select: {}", table);

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        check_status(status, &body)?;
        parse_rows(&body)
    }

    async fn upsert(&self, table: &str, key_column: &str, row: Record) -> Result<(), StoreError> {
        let url = self.upsert_url(table, key_column)?;
        debug!("Store upsert: {} on {}", table, key_column);

        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[Value::Object(row)])
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        check_status(status, &body)
    }
}
