//! Dispatch timeouts from TOML (`[dispatch]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Per provider HTTP request
    pub request_timeout_seconds: u64,
    /// Wall-clock bound on one handler, including token refresh
    pub handler_timeout_seconds: u64,
}

impl Default for FileDispatchConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 10,
            handler_timeout_seconds: 15,
        }
    }
}
