//! Cache lifetimes from TOML (`[cache]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub tool_result_ttl_seconds: u64,
    pub manifest_ttl_seconds: u64,
    pub registry_ttl_seconds: u64,
    pub token_mirror_ttl_seconds: u64,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            tool_result_ttl_seconds: 300,
            manifest_ttl_seconds: 3600,
            registry_ttl_seconds: 3600,
            token_mirror_ttl_seconds: 43200,
        }
    }
}
