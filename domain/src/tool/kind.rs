//! Closed set of tool kinds with a handler implementation.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Provider family, derived from the tool name prefix.
///
/// The family decides which cross-cutting parameters a call receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFamily {
    /// Chat platforms (`slack_*`)
    Messaging,
    /// Issue trackers (`jira_*`)
    IssueTracker,
    /// Document workspaces (`notion_*`)
    Document,
    Other,
}

impl ToolFamily {
    pub fn of_name(name: &str) -> Self {
        if name.starts_with("slack_") {
            ToolFamily::Messaging
        } else if name.starts_with("jira_") {
            ToolFamily::IssueTracker
        } else if name.starts_with("notion_") {
            ToolFamily::Document
        } else {
            ToolFamily::Other
        }
    }

    /// Provider identifier for the family, if it is tied to one.
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            ToolFamily::Messaging => Some("slack"),
            ToolFamily::IssueTracker => Some("jira"),
            ToolFamily::Document => Some("notion"),
            ToolFamily::Other => None,
        }
    }
}

/// Every tool name a handler exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    SlackSearchMessages,
    SlackListChannels,
    SlackGetChannelMessages,
    JiraSearchIssues,
    JiraGetIssue,
    JiraCreateIssue,
    JiraAddComment,
    JiraUpdateIssue,
    NotionSearch,
    NotionQueryDatabase,
    NotionRetrievePage,
}

impl ToolKind {
    pub const ALL: [ToolKind; 11] = [
        ToolKind::SlackSearchMessages,
        ToolKind::SlackListChannels,
        ToolKind::SlackGetChannelMessages,
        ToolKind::JiraSearchIssues,
        ToolKind::JiraGetIssue,
        ToolKind::JiraCreateIssue,
        ToolKind::JiraAddComment,
        ToolKind::JiraUpdateIssue,
        ToolKind::NotionSearch,
        ToolKind::NotionQueryDatabase,
        ToolKind::NotionRetrievePage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::SlackSearchMessages => "slack_search_messages",
            ToolKind::SlackListChannels => "slack_list_channels",
            ToolKind::SlackGetChannelMessages => "slack_get_channel_messages",
            ToolKind::JiraSearchIssues => "jira_search_issues",
            ToolKind::JiraGetIssue => "jira_get_issue",
            ToolKind::JiraCreateIssue => "jira_create_issue",
            ToolKind::JiraAddComment => "jira_add_comment",
            ToolKind::JiraUpdateIssue => "jira_update_issue",
            ToolKind::NotionSearch => "notion_search",
            ToolKind::NotionQueryDatabase => "notion_query_database",
            ToolKind::NotionRetrievePage => "notion_retrieve_page",
        }
    }

    pub fn family(&self) -> ToolFamily {
        ToolFamily::of_name(self.as_str())
    }

    /// The family's primary search operation, which gets a synthesized query.
    pub fn is_family_search(&self) -> bool {
        matches!(
            self,
            ToolKind::SlackSearchMessages | ToolKind::JiraSearchIssues | ToolKind::NotionSearch
        )
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnknownToolKind(s.to_string()))
    }
}
