//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface.

mod repl;

pub use repl::ChatRepl;
