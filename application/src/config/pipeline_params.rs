//! Pipeline parameters: TTLs, timeouts and classifier switches.
//!
//! [`PipelineParams`] groups the static knobs used by the request pipeline
//! use cases. The infrastructure config layer builds it from the loaded file
//! configuration.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Lifetime of a cached tool result.
    pub tool_result_ttl: Duration,
    /// Lifetime of a cached manifest.
    pub manifest_ttl: Duration,
    /// Lifetime of the cached registry rows.
    pub registry_ttl: Duration,
    /// Lifetime of a token in the fast mirror.
    pub token_mirror_ttl: Duration,
    /// Wall-clock bound on a single handler invocation.
    pub handler_timeout: Duration,
    /// Answer greetings and empty prompts without calling the intent model.
    pub fast_path: bool,
    /// Use the intent model at all; `false` means heuristic only.
    pub use_llm_classifier: bool,
    /// Messaging account whose own messages are excluded from search.
    pub service_account: String,
    /// Durable table holding tool descriptors.
    pub registry_table: String,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            tool_result_ttl: Duration::from_secs(300),
            manifest_ttl: Duration::from_secs(3600),
            registry_ttl: Duration::from_secs(3600),
            token_mirror_ttl: Duration::from_secs(43200),
            handler_timeout: Duration::from_secs(15),
            fast_path: true,
            use_llm_classifier: true,
            service_account: "uni-app".to_string(),
            registry_table: "context_registry".to_string(),
        }
    }
}

impl PipelineParams {
    // ==================== Builder Methods ====================

    pub fn with_tool_result_ttl(mut self, ttl: Duration) -> Self {
        self.tool_result_ttl = ttl;
        self
    }

    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub fn with_fast_path(mut self, enabled: bool) -> Self {
        self.fast_path = enabled;
        self
    }

    pub fn with_llm_classifier(mut self, enabled: bool) -> Self {
        self.use_llm_classifier = enabled;
        self
    }

    pub fn with_service_account(mut self, account: impl Into<String>) -> Self {
        self.service_account = account.into();
        self
    }

    pub fn with_registry_table(mut self, table: impl Into<String>) -> Self {
        self.registry_table = table.into();
        self
    }
}
