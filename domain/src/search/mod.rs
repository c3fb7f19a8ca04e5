//! Search domain module
//!
//! Folds provider-native search payloads into one [`SearchResponse`].
//! Payloads are recognised by shape, not by a provider tag:
//!
//! | Shape | Category |
//! |-------|----------|
//! | `{"messages": {"matches": [...]}}` | `slack_matches` |
//! | `{"results": [...]}` | `notion_matches` |
//! | `{"issues": [...]}` | `jira_matches` |

pub mod aggregator;
pub mod entities;

pub use aggregator::SearchAggregator;
pub use entities::{AuthHint, IssueMatch, MessageMatch, PageMatch, SearchResponse};
