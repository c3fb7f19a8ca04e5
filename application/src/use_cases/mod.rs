//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod classify_intent;
pub mod dispatch_tools;
pub mod handle_prompt;
pub mod token_store;
pub mod tool_catalog;
