//! Infrastructure layer for switchboard
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod handlers;
pub mod intents;
pub mod llm;
pub mod oauth;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig, FileOutputFormat,
    StoreBackend,
};
pub use handlers::build_handler_table;
pub use intents::{IntentCatalogError, load_intent_catalog};
pub use llm::{OllamaIntentModel, OpenAiGateway};
pub use oauth::{JiraOAuth, SlackOAuth};
pub use storage::{InMemoryCache, InMemoryRecordStore, SupabaseRecordStore};
