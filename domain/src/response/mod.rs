//! Final response returned for one prompt.

use crate::integration::IntegrationStatus;
use crate::search::SearchResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GREETING_REPLY: &str = "Hi! How can I help you today?";
pub const SUMMARIZE_REPLY: &str = "Sure! Please specify what you'd like summarized (e.g., the current conversation, a document, etc.).";
pub const CLARIFY_FALLBACK: &str = "Could you tell me a bit more about what you're looking for? For example, which tool (Slack, Jira or Notion) or which topic?";

/// `{message}`, `{system_status}` or a structured search payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptResponse {
    Message {
        message: String,
    },
    SystemStatus {
        system_status: BTreeMap<String, IntegrationStatus>,
    },
    Search(SearchResponse),
}

impl PromptResponse {
    pub fn message(message: impl Into<String>) -> Self {
        PromptResponse::Message {
            message: message.into(),
        }
    }

    /// Structured payload, or the "nothing found" message when empty.
    pub fn from_search(search: SearchResponse) -> Self {
        if search.is_empty() {
            PromptResponse::message(search.nothing_found_message())
        } else {
            PromptResponse::Search(search)
        }
    }

    pub fn as_message(&self) -> Option<&str> {
        match self {
            PromptResponse::Message { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_wire_shape() {
        let value = serde_json::to_value(PromptResponse::message(GREETING_REPLY)).unwrap();
        assert_eq!(value, json!({"message": "Hi! How can I help you today?"}));
    }

    #[test]
    fn test_empty_search_becomes_message() {
        let response = PromptResponse::from_search(SearchResponse::default());
        assert!(response.as_message().unwrap().starts_with("Sorry"));
    }

    #[test]
    fn test_status_wire_shape() {
        let mut status = BTreeMap::new();
        status.insert("jira".to_string(), IntegrationStatus::disconnected());
        let value = serde_json::to_value(PromptResponse::SystemStatus { system_status: status }).unwrap();
        assert_eq!(value, json!({"system_status": {"jira": {"connected": false}}}));
    }
}
