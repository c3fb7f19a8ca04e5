//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod cache_store;
pub mod intent_model;
pub mod llm_gateway;
pub mod oauth_provider;
pub mod record_store;
pub mod tool_handler;
