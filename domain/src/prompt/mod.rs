//! Prompt domain
//!
//! Templates for every model call in the request pipeline, plus cleanup of
//! model output before it reaches a chat platform.

pub mod cleanup;
mod template;

pub use cleanup::clean_output;
pub use template::PromptTemplate;
