//! Durable store configuration from TOML (`[store]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local tables, optionally seeded from a JSON file
    #[default]
    Memory,
    /// Supabase (PostgREST) tables over HTTPS
    Supabase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    pub backend: StoreBackend,
    /// Project URL (supabase backend)
    pub url: Option<String>,
    /// Service role key (supabase backend)
    pub service_key: Option<String>,
    /// Table holding tool descriptors
    pub registry_table: String,
    /// `{"<table>": [rows...]}` loaded into the memory backend at startup
    pub seed_file: Option<PathBuf>,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: None,
            service_key: None,
            registry_table: "context_registry".to_string(),
            seed_file: None,
        }
    }
}
