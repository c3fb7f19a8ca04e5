//! Intent classifier configuration from TOML (`[intent]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Locally hosted generation model used for intent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIntentConfig {
    pub base_url: String,
    pub model: String,
    /// Bound on one classification request, including streaming.
    pub timeout_seconds: u64,
    /// Bound on the reachability probe.
    pub probe_timeout_seconds: u64,
    /// Command that starts the model server when it is not reachable.
    /// Empty disables the warm-up.
    pub start_command: Vec<String>,
    /// How long to wait after starting the server before probing again.
    pub startup_grace_millis: u64,
    /// Answer greetings and empty prompts without calling the model.
    pub fast_path: bool,
    /// `false` classifies with keyword rules only.
    pub use_llm: bool,
    /// JSON intent catalog replacing the built-in one.
    pub intents_file: Option<PathBuf>,
}

impl Default for FileIntentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "phi3:mini".to_string(),
            timeout_seconds: 30,
            probe_timeout_seconds: 2,
            start_command: vec!["ollama".to_string(), "serve".to_string()],
            startup_grace_millis: 2000,
            fast_path: true,
            use_llm: true,
            intents_file: None,
        }
    }
}
