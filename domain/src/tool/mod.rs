//! Tool domain module
//!
//! A tool is a named, schema-described provider operation. The types here
//! follow one request through the dispatch pipeline:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolRegistry │───▶│ ToolCall     │───▶│ PreparedCall │───▶│ ToolResult   │
//! │ (snapshot)   │    │ (selected)   │    │ (injected)   │    │ (mapping)    │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! - [`ToolRegistry`] holds the enabled/primary flags and answers manifest and
//!   provider-detection queries.
//! - [`ToolKind`] is the closed set of names with a handler; anything else in
//!   the registry resolves to "no handler".
//! - [`ToolFamily`] comes from the name prefix and decides which parameters
//!   are injected (see [`invocation`]).
//! - [`ToolResult`] is always a JSON mapping; failures carry an `error` key and
//!   are never cached.

pub mod entities;
pub mod invocation;
pub mod kind;
pub mod registry;
pub mod value_objects;

pub use entities::{Parameters, ToolCall, ToolDescriptor};
pub use invocation::{InjectionContext, PreparedCall, Preparation, cache_key};
pub use kind::{ToolFamily, ToolKind};
pub use registry::ToolRegistry;
pub use value_objects::ToolResult;
