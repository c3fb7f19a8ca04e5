//! Unified search result entities

use serde::{Deserialize, Serialize};

/// A message from a messaging provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMatch {
    pub text: String,
    pub user: String,
    pub channel_type: String,
    pub permalink: String,
}

/// A page from a document workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMatch {
    pub title: String,
    pub permalink: String,
    pub summary: String,
    pub last_edited: String,
    pub status: String,
}

/// An issue from an issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMatch {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub permalink: String,
}

/// A provider that asked for authorization during the search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthHint {
    pub provider: String,
    pub auth_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub match_count: usize,
    pub notion_matches: Vec<PageMatch>,
    pub slack_matches: Vec<MessageMatch>,
    #[serde(default)]
    pub jira_matches: Vec<IssueMatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auth_hints: Vec<AuthHint>,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.match_count == 0
    }

    /// Fixed reply used when nothing matched, with connect links if any
    /// provider still needs authorization.
    pub fn nothing_found_message(&self) -> String {
        let mut message = String::from(NOTHING_FOUND);
        for hint in &self.auth_hints {
            message.push_str(&format!(
                "\nConnect {} to include it in searches: {}",
                hint.provider, hint.auth_url
            ));
        }
        message
    }
}

pub const NOTHING_FOUND: &str = "Sorry, I couldn't find any information in Slack, Jira or Notion.";
