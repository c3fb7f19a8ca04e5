//! Hand-written fakes for every port, shared by the use case tests.

use crate::ports::cache_store::CacheStore;
use crate::ports::intent_model::IntentModel;
use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use crate::ports::oauth_provider::{OAuthError, OAuthProvider};
use crate::ports::record_store::{Record, RecordStore, StoreError};
use crate::ports::tool_handler::ToolHandler;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use switchboard_domain::{Message, Parameters, StreamEvent, ToolCall, ToolDescriptor, TokenGrant};
use tokio::sync::mpsc;

// ==================== Stores ====================

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
    pub sets: AtomicUsize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: String, _ttl: Option<Duration>) -> Result<(), StoreError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRecords {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    pub selects: AtomicUsize,
    pub fail: AtomicBool,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        self.tables.lock().unwrap().insert(table.to_string(), rows);
        self
    }

    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecords {
    async fn select(&self, table: &str, filter: &[(&str, &str)]) -> Result<Vec<Record>, StoreError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("database offline".into()));
        }
        Ok(self
            .rows(table)
            .into_iter()
            .filter(|row| {
                filter
                    .iter()
                    .all(|(col, val)| row.get(*col).and_then(Value::as_str) == Some(*val))
            })
            .collect())
    }

    async fn upsert(&self, table: &str, key_column: &str, row: Record) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("database offline".into()));
        }
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let key = row.get(key_column).cloned();
        match rows.iter_mut().find(|r| r.get(key_column).cloned() == key) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        Ok(())
    }
}

// ==================== Models ====================

/// Chat gateway with canned answers.
#[derive(Default)]
pub struct ScriptedLlm {
    pub chat_reply: Mutex<Option<String>>,
    pub selected: Mutex<Vec<ToolCall>>,
    pub fail: AtomicBool,
    pub chat_calls: AtomicUsize,
    pub offered: Mutex<Vec<Vec<String>>>,
    pub last_messages: Mutex<Vec<Message>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(self, reply: &str) -> Self {
        *self.chat_reply.lock().unwrap() = Some(reply.to_string());
        self
    }

    pub fn selecting(self, calls: Vec<ToolCall>) -> Self {
        *self.selected.lock().unwrap() = calls;
        self
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl LlmGateway for ScriptedLlm {
    async fn chat(&self, messages: &[Message]) -> Result<String, GatewayError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::ConnectionError("offline".into()));
        }
        Ok(self.chat_reply.lock().unwrap().clone().unwrap_or_default())
    }

    async fn select_tools(
        &self,
        _messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> Result<Vec<ToolCall>, GatewayError> {
        self.offered
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.name.clone()).collect());
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::ConnectionError("offline".into()));
        }
        Ok(self.selected.lock().unwrap().clone())
    }
}

/// Intent model that may start unreachable and comes up on warm-up.
#[derive(Default)]
pub struct ScriptedIntentModel {
    pub ready: AtomicBool,
    pub starts_on_warm_up: bool,
    pub output: String,
    pub generate_error: Option<String>,
    pub generations: AtomicUsize,
    pub warm_ups: AtomicUsize,
}

impl ScriptedIntentModel {
    pub fn answering(output: &str) -> Self {
        Self {
            ready: AtomicBool::new(true),
            output: output.to_string(),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntentModel for ScriptedIntentModel {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn warm_up(&self) -> Result<(), GatewayError> {
        self.warm_ups.fetch_add(1, Ordering::SeqCst);
        if self.starts_on_warm_up {
            self.ready.store(true, Ordering::SeqCst);
            Ok(())
        } else {
            Err(GatewayError::ConnectionError("connection refused".into()))
        }
    }

    async fn generate(&self, _prompt: &str) -> Result<StreamHandle, GatewayError> {
        self.generations.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(4);
        match &self.generate_error {
            Some(error) => {
                let _ = tx.send(StreamEvent::Error(error.clone())).await;
            }
            None => {
                let _ = tx.send(StreamEvent::Delta(self.output.clone())).await;
                let _ = tx.send(StreamEvent::Completed(String::new())).await;
            }
        }
        Ok(StreamHandle::new(rx))
    }
}

// ==================== OAuth ====================

pub struct FakeOAuth {
    pub provider: String,
    pub grant: Mutex<Result<TokenGrant, OAuthError>>,
    pub refreshes: AtomicUsize,
}

impl FakeOAuth {
    pub fn granting(provider: &str, access_token: &str) -> Self {
        Self {
            provider: provider.to_string(),
            grant: Mutex::new(Ok(TokenGrant {
                access_token: access_token.to_string(),
                refresh_token: Some("refresh-new".into()),
                expires_in: 3600,
                scope: None,
                provider_user_id: None,
            })),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(provider: &str, error: &str) -> Self {
        Self {
            provider: provider.to_string(),
            grant: Mutex::new(Err(OAuthError::Rejected(error.to_string()))),
            refreshes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl OAuthProvider for FakeOAuth {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://auth.example/{}?state={}", self.provider, state)
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, OAuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.grant.lock().unwrap().clone()
    }
}

// ==================== Handlers ====================

/// Returns a fixed value and records every parameter map it receives.
pub struct CountingHandler {
    pub reply: Value,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Parameters>>,
}

impl CountingHandler {
    pub fn new(reply: Value) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(reply: Value, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(reply)
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolHandler for CountingHandler {
    async fn call(&self, params: &Parameters) -> Value {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(params.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

/// Registry rows for the three providers used across the tests.
pub fn registry_rows() -> Vec<Value> {
    use serde_json::json;
    vec![
        json!({"name": "slack_search_messages", "provider": "slack", "description": "Search Slack", "primary_search": true,
               "parameters_schema": {"type": "object", "properties": {"query": {"type": "string"}}}}),
        json!({"name": "slack_list_channels", "provider": "slack", "description": "List channels"}),
        json!({"name": "jira_search_issues", "provider": "jira", "description": "Search Jira", "primary_search": true}),
        json!({"name": "jira_get_issue", "provider": "jira", "description": "Get issue"}),
        json!({"name": "notion_search", "provider": "notion", "description": "Search Notion", "primary_search": true}),
        json!({"name": "notion_retrieve_page", "provider": "notion", "description": "Page", "enabled": false}),
        json!({"name": "github_search_code", "provider": "github", "description": "No handler", "primary_search": false}),
    ]
}
