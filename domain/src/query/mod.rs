//! Deterministic query extraction from natural-language prompts.
//!
//! - [`jql`] builds an issue-tracker query (JQL) from a prompt.
//! - [`keywords`] reduces a prompt to search keywords for message search.

pub mod jql;
pub mod keywords;

pub use jql::prompt_to_jql;
pub use keywords::extract_keywords;
