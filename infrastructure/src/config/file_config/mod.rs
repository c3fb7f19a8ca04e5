//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is `#[serde(default)]`, so a partial file only overrides
//! what it names.

mod cache;
mod dispatch;
mod intent;
mod llm;
mod output;
mod providers;
mod store;

pub use cache::FileCacheConfig;
pub use dispatch::FileDispatchConfig;
pub use intent::FileIntentConfig;
pub use llm::FileLlmConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use providers::{FileJiraConfig, FileNotionConfig, FileProvidersConfig, FileSlackConfig};
pub use store::{FileStoreConfig, StoreBackend};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use switchboard_application::PipelineParams;
use thiserror::Error;

/// Errors for configuration values that cannot work
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroDuration(&'static str),

    #[error("model name cannot be empty ({0})")]
    EmptyModelName(&'static str),

    #[error("store.backend = \"supabase\" requires store.{0}")]
    MissingStoreSetting(&'static str),

    #[error("store.registry_table cannot be empty")]
    EmptyRegistryTable,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat model for tool selection and finalization
    pub llm: FileLlmConfig,
    /// Intent classifier model
    pub intent: FileIntentConfig,
    /// Cache lifetimes
    pub cache: FileCacheConfig,
    /// Durable store backend
    pub store: FileStoreConfig,
    /// Provider call timeouts
    pub dispatch: FileDispatchConfig,
    /// Slack, Jira and Notion settings
    pub providers: FileProvidersConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let durations = [
            ("llm.timeout_seconds", self.llm.timeout_seconds),
            ("intent.timeout_seconds", self.intent.timeout_seconds),
            ("intent.probe_timeout_seconds", self.intent.probe_timeout_seconds),
            ("cache.tool_result_ttl_seconds", self.cache.tool_result_ttl_seconds),
            ("cache.manifest_ttl_seconds", self.cache.manifest_ttl_seconds),
            ("cache.registry_ttl_seconds", self.cache.registry_ttl_seconds),
            ("cache.token_mirror_ttl_seconds", self.cache.token_mirror_ttl_seconds),
            ("dispatch.request_timeout_seconds", self.dispatch.request_timeout_seconds),
            ("dispatch.handler_timeout_seconds", self.dispatch.handler_timeout_seconds),
        ];
        if let Some((field, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigValidationError::ZeroDuration(*field));
        }

        if self.llm.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName("llm.model"));
        }
        if self.intent.use_llm && self.intent.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName("intent.model"));
        }

        if self.store.registry_table.trim().is_empty() {
            return Err(ConfigValidationError::EmptyRegistryTable);
        }
        if self.store.backend == StoreBackend::Supabase {
            if blank(&self.store.url) {
                return Err(ConfigValidationError::MissingStoreSetting("url"));
            }
            if blank(&self.store.service_key) {
                return Err(ConfigValidationError::MissingStoreSetting("service_key"));
            }
        }

        Ok(())
    }

    /// Pipeline knobs for the application layer.
    pub fn pipeline_params(&self) -> PipelineParams {
        PipelineParams {
            tool_result_ttl: Duration::from_secs(self.cache.tool_result_ttl_seconds),
            manifest_ttl: Duration::from_secs(self.cache.manifest_ttl_seconds),
            registry_ttl: Duration::from_secs(self.cache.registry_ttl_seconds),
            token_mirror_ttl: Duration::from_secs(self.cache.token_mirror_ttl_seconds),
            handler_timeout: Duration::from_secs(self.dispatch.handler_timeout_seconds),
            fast_path: self.intent.fast_path,
            use_llm_classifier: self.intent.use_llm,
            service_account: self.providers.slack.service_account.clone(),
            registry_table: self.store.registry_table.clone(),
        }
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}
