//! Application layer for switchboard
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::PipelineParams;
pub use ports::{
    cache_store::CacheStore,
    intent_model::IntentModel,
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
    oauth_provider::{OAuthError, OAuthProvider},
    record_store::{Record, RecordStore, StoreError},
    tool_handler::{HandlerTable, ToolHandler},
};
pub use use_cases::classify_intent::IntentClassifier;
pub use use_cases::dispatch_tools::ToolDispatcher;
pub use use_cases::handle_prompt::{HandlePromptError, HandlePromptInput, HandlePromptUseCase};
pub use use_cases::token_store::TokenStore;
pub use use_cases::tool_catalog::{CatalogError, ToolCatalog};
