//! Shape-driven aggregation of search results.

use super::entities::{AuthHint, IssueMatch, MessageMatch, PageMatch, SearchResponse};
use crate::tool::ToolResult;
use chrono::DateTime;
use serde_json::{Map, Value};
use std::collections::HashSet;

const DEFAULT_PAGE_TITLE: &str = "Notion Page";
const PAGE_SUMMARY_PLACEHOLDER: &str = "Fetching...";

/// Normalizes and deduplicates heterogeneous search payloads.
#[derive(Debug, Clone)]
pub struct SearchAggregator {
    /// Messages authored by this account are dropped
    service_account: String,
}

impl Default for SearchAggregator {
    fn default() -> Self {
        Self::new("uni-app")
    }
}

impl SearchAggregator {
    pub fn new(service_account: impl Into<String>) -> Self {
        Self {
            service_account: service_account.into(),
        }
    }

    pub fn aggregate(&self, results: &[ToolResult], query: &str) -> SearchResponse {
        let mut response = SearchResponse {
            query: query.to_string(),
            ..SearchResponse::default()
        };
        let mut seen_messages = HashSet::new();
        let mut seen_pages = HashSet::new();
        let mut seen_issues = HashSet::new();

        for result in results {
            if result.is_auth_required() {
                // No link to offer when the provider has no OAuth client
                if let (Some(provider), Some(auth_url)) = (
                    result.provider(),
                    result.auth_url().filter(|url| !url.is_empty()),
                ) {
                    let hint = AuthHint {
                        provider: provider.to_string(),
                        auth_url: auth_url.to_string(),
                    };
                    if !response.auth_hints.contains(&hint) {
                        response.auth_hints.push(hint);
                    }
                }
                continue;
            }

            let payload = result.as_map();
            if let Some(matches) = payload
                .get("messages")
                .and_then(Value::as_object)
                .and_then(|m| m.get("matches"))
                .and_then(Value::as_array)
            {
                for item in matches.iter().filter_map(Value::as_object) {
                    if let Some(message) = self.message_match(item)
                        && seen_messages.insert((message.permalink.clone(), message.text.clone()))
                    {
                        response.slack_matches.push(message);
                    }
                }
            } else if let Some(pages) = payload.get("results").and_then(Value::as_array) {
                for item in pages.iter().filter_map(Value::as_object) {
                    if let Some(page) = page_match(item)
                        && seen_pages.insert(page.permalink.clone())
                    {
                        response.notion_matches.push(page);
                    }
                }
            } else if let Some(issues) = payload.get("issues").and_then(Value::as_array) {
                for item in issues.iter().filter_map(Value::as_object) {
                    if let Some(issue) = issue_match(item)
                        && seen_issues.insert(issue.key.clone())
                    {
                        response.jira_matches.push(issue);
                    }
                }
            }
        }

        response.match_count = response.slack_matches.len()
            + response.notion_matches.len()
            + response.jira_matches.len();
        response
    }

    fn message_match(&self, item: &Map<String, Value>) -> Option<MessageMatch> {
        let user = str_field(item, "username")
            .or_else(|| str_field(item, "user"))
            .unwrap_or_default();
        if user == self.service_account {
            return None;
        }
        let permalink = str_field(item, "permalink").or_else(|| str_field(item, "url"))?;
        let channel_type = match str_field(item, "type") {
            Some("im") => "Direct Message".to_string(),
            other => other.unwrap_or_default().to_string(),
        };

        Some(MessageMatch {
            text: str_field(item, "text").unwrap_or_default().to_string(),
            user: user.to_string(),
            channel_type,
            permalink: permalink.to_string(),
        })
    }
}

fn page_match(item: &Map<String, Value>) -> Option<PageMatch> {
    let permalink = str_field(item, "url")?;
    let properties: Vec<&Map<String, Value>> = item
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.values().filter_map(Value::as_object).collect())
        .unwrap_or_default();

    let title = properties
        .iter()
        .find(|p| str_field(p, "type") == Some("title") && is_non_empty_array(p.get("title")))
        .and_then(|p| p.get("title").and_then(Value::as_array))
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("plain_text").and_then(Value::as_str))
                .collect::<String>()
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string());

    let status = properties
        .iter()
        .find(|p| str_field(p, "type") == Some("status") && p.get("status").is_some_and(Value::is_object))
        .and_then(|p| p.get("status"))
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(PageMatch {
        title,
        permalink: permalink.to_string(),
        summary: PAGE_SUMMARY_PLACEHOLDER.to_string(),
        last_edited: format_last_edited(str_field(item, "last_edited_time").unwrap_or_default()),
        status,
    })
}

fn issue_match(item: &Map<String, Value>) -> Option<IssueMatch> {
    let key = str_field(item, "key")?;
    let fields = item.get("fields");
    let summary = fields
        .and_then(|f| f.get("summary"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let status = fields
        .and_then(|f| f.get("status"))
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    Some(IssueMatch {
        key: key.to_string(),
        summary: summary.to_string(),
        status: status.to_string(),
        permalink: str_field(item, "self").unwrap_or_default().to_string(),
    })
}

/// `2024-03-05T10:00:00.000Z` → `05 March 2024`; unparseable input is kept.
fn format_last_edited(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%d %B %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn str_field<'a>(item: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn is_non_empty_array(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slack(matches: Value) -> ToolResult {
        ToolResult::from_value(json!({"ok": true, "messages": {"matches": matches}}))
    }

    #[test]
    fn test_message_dedup_and_service_account() {
        let results = vec![
            slack(json!([
                {"text": "ship it", "username": "ana", "type": "im", "permalink": "https://s/1"},
                {"text": "ship it", "username": "ana", "type": "im", "permalink": "https://s/1"},
                {"text": "bot reply", "username": "uni-app", "permalink": "https://s/2"},
                {"text": "no link", "username": "bo"}
            ])),
            slack(json!([
                {"text": "ship it", "user": "U9", "type": "channel", "permalink": "https://s/1"},
                {"text": "ship it later", "user": "U9", "type": "channel", "permalink": "https://s/1"}
            ])),
        ];

        let response = SearchAggregator::default().aggregate(&results, "ship");
        assert_eq!(response.slack_matches.len(), 2);
        assert_eq!(response.match_count, 2);
        assert_eq!(response.slack_matches[0].channel_type, "Direct Message");
        assert_eq!(response.slack_matches[0].user, "ana");
        assert_eq!(response.slack_matches[1].text, "ship it later");
        assert_eq!(response.query, "ship");
    }

    #[test]
    fn test_page_mapping() {
        let result = ToolResult::from_value(json!({"results": [
            {
                "url": "https://notion.so/p1",
                "last_edited_time": "2024-03-05T10:00:00.000Z",
                "properties": {
                    "Name": {"type": "title", "title": [{"plain_text": "Q3 "}, {"plain_text": "Roadmap"}]},
                    "State": {"type": "status", "status": {"name": "In review"}}
                }
            },
            {"url": "https://notion.so/p1", "properties": {}},
            {"url": "https://notion.so/p2", "last_edited_time": "last week", "properties": {
                "Name": {"type": "title", "title": []}
            }},
            {"object": "page"}
        ]}));

        let response = SearchAggregator::default().aggregate(&[result], "roadmap");
        assert_eq!(response.notion_matches.len(), 2);

        let first = &response.notion_matches[0];
        assert_eq!(first.title, "Q3 Roadmap");
        assert_eq!(first.last_edited, "05 March 2024");
        assert_eq!(first.status, "In review");
        assert_eq!(first.summary, "Fetching...");

        let second = &response.notion_matches[1];
        assert_eq!(second.title, "Notion Page");
        assert_eq!(second.last_edited, "last week");
        assert_eq!(second.status, "");
    }

    #[test]
    fn test_issue_mapping() {
        let result = ToolResult::from_value(json!({"issues": [
            {"key": "ABC-1", "self": "https://api/issue/1", "fields": {"summary": "Onboarding", "status": {"name": "Open"}}},
            {"key": "ABC-1", "fields": {"summary": "dup"}},
            {"id": "no-key"}
        ]}));

        let response = SearchAggregator::default().aggregate(&[result], "onboarding");
        assert_eq!(response.jira_matches.len(), 1);
        assert_eq!(response.jira_matches[0].status, "Open");
        assert_eq!(response.match_count, 1);
    }

    #[test]
    fn test_auth_hints_and_nothing_found() {
        let results = vec![
            ToolResult::auth_required("slack", "https://slack/auth", "authorize"),
            ToolResult::auth_required("slack", "https://slack/auth", "authorize"),
            ToolResult::from_value(json!({"error": "notion_api_error"})),
        ];

        let response = SearchAggregator::default().aggregate(&results, "anything");
        assert!(response.is_empty());
        assert_eq!(response.auth_hints.len(), 1);

        let message = response.nothing_found_message();
        assert!(message.starts_with("Sorry, I couldn't find any information"));
        assert!(message.contains("https://slack/auth"));
    }

    #[test]
    fn test_auth_hint_without_url_is_skipped() {
        let results = vec![
            ToolResult::auth_required("slack", "", "authorize"),
            ToolResult::auth_required("jira", "https://jira/auth", "authorize"),
        ];

        let response = SearchAggregator::default().aggregate(&results, "anything");
        assert_eq!(
            response.auth_hints,
            vec![AuthHint {
                provider: "jira".into(),
                auth_url: "https://jira/auth".into(),
            }]
        );

        let message = response.nothing_found_message();
        assert!(!message.contains("Connect slack"));
        assert!(message.contains("Connect jira"));
    }

    #[test]
    fn test_custom_service_account() {
        let results = vec![slack(json!([
            {"text": "hello", "username": "uni-app", "permalink": "https://s/1"},
            {"text": "hello", "username": "helper-bot", "permalink": "https://s/2"}
        ]))];
        let response = SearchAggregator::new("helper-bot").aggregate(&results, "hello");
        assert_eq!(response.slack_matches.len(), 1);
        assert_eq!(response.slack_matches[0].user, "uni-app");
    }
}
