//! Intent domain module
//!
//! Every prompt is classified into exactly one [`Intent`] before any provider
//! work happens. The intent drives which branch of the request pipeline runs:
//!
//! | Intent | Pipeline branch |
//! |--------|-----------------|
//! | `smalltalk` | canned greeting, no provider calls |
//! | `ambiguous` | clarifying question, no provider calls |
//! | `summarize` | request for a target (unless a provider is named) |
//! | `system_status` | integration status from the token store |
//! | `search_data` | dispatch + structured aggregation |
//! | `other` | dispatch + LLM finalization |
//!
//! Classification has two paths. The [`heuristic`] path is pure keyword and
//! shape matching. The LLM path lives in the application layer and uses the
//! [`catalog`] to build its prompt and [`parsing`] to read the reply back.

pub mod catalog;
pub mod entities;
pub mod heuristic;
pub mod parsing;

pub use catalog::{IntentCatalog, IntentDefinition};
pub use entities::{Classification, Intent};
pub use heuristic::{classify_heuristic, fast_path};
pub use parsing::parse_classification;
