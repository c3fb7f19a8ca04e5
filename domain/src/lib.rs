//! Domain layer for switchboard
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Request pipeline
//!
//! Every prompt is classified into an [`Intent`]. Conversational intents are
//! answered directly; the rest select tools from the [`ToolRegistry`], run
//! them, and fold the [`ToolResult`]s into one [`PromptResponse`].
//!
//! ## Tool families
//!
//! Tools are grouped by [`ToolFamily`] (messaging, issue tracker, document).
//! The family decides which request-scoped parameters a call receives before
//! it reaches its handler.

pub mod core;
pub mod integration;
pub mod intent;
pub mod prompt;
pub mod query;
pub mod response;
pub mod search;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use core::error::DomainError;
pub use integration::{IntegrationStatus, IntegrationToken, TokenGrant, TokenLookup};
pub use intent::{Classification, Intent, IntentCatalog, IntentDefinition};
pub use prompt::{PromptTemplate, clean_output};
pub use response::PromptResponse;
pub use search::{SearchAggregator, SearchResponse};
pub use session::{Message, Role, StreamEvent};
pub use tool::{
    InjectionContext, Parameters, Preparation, PreparedCall, ToolCall, ToolDescriptor, ToolFamily,
    ToolKind, ToolRegistry, ToolResult,
};
