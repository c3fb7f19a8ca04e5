//! Tool handler port
//!
//! One handler per [`ToolKind`]. The [`HandlerTable`] is built once at
//! startup; the dispatcher never looks handlers up by anything but kind.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use switchboard_domain::{Parameters, ToolKind};

/// Runs one provider operation.
///
/// Handlers never fail with `Err`: provider and argument failures are
/// returned as `{error, ...}` values.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, params: &Parameters) -> Value;
}

#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<ToolKind, Arc<dyn ToolHandler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: ToolKind, handler: Arc<dyn ToolHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().map(ToolKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("HandlerTable").field("kinds", &kinds).finish()
    }
}
