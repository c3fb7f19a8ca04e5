//! Prompt → JQL extraction.
//!
//! Clause order is fixed: project, text, status, assignee. Clauses are joined
//! with ` AND `. When no rule matches, the whole prompt becomes a text search.

use crate::core::string::normalize_prompt;
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:about|for|on|related\s+to|regarding)\s+(?:the\s+)?([a-z0-9\-]+(?:\s+[a-z0-9\-]+)*?)(?:\s+(?:in\s+project|assigned\s+to|by|that|which|with)\b|\s*[.,;:!?]|\s*$)",
    )
    .expect("topic regex")
});

#[allow(clippy::expect_used)]
static OPEN_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:open|in progress)\b").expect("open status regex"));

#[allow(clippy::expect_used)]
static CLOSED_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:closed|done)\b").expect("closed status regex"));

#[allow(clippy::expect_used)]
static ASSIGNEE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:assigned\s+to|by)\s+([a-z0-9_.@\-]+)").expect("assignee regex")
});

#[allow(clippy::expect_used)]
static PROJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bin\s+project\s+([a-z0-9\-]+)").expect("project regex")
});

/// Convert a prompt into a simple JQL query.
pub fn prompt_to_jql(prompt: &str) -> String {
    let normalized = normalize_prompt(prompt);
    let mut clauses = Vec::new();

    if let Some(project) = PROJECT.captures(prompt).and_then(|c| c.get(1)) {
        clauses.push(format!("project = \"{}\"", project.as_str().to_uppercase()));
    }

    if let Some(topic) = TOPIC.captures(&normalized).and_then(|c| c.get(1)) {
        clauses.push(format!("text ~ \"{}\"", topic.as_str().trim()));
    }

    if OPEN_STATUS.is_match(&normalized) {
        clauses.push("status in (\"Open\", \"In Progress\")".to_string());
    } else if CLOSED_STATUS.is_match(&normalized) {
        clauses.push("status in (\"Done\", \"Closed\")".to_string());
    }

    if let Some(assignee) = ASSIGNEE.captures(prompt).and_then(|c| c.get(1)) {
        let assignee = assignee.as_str().trim_end_matches(['.', '-']);
        clauses.push(format!("assignee = \"{}\"", assignee));
    }

    if clauses.is_empty() {
        clauses.push(format!("text ~ \"{}\"", normalized.replace('"', "")));
    }

    clauses.join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_and_topic() {
        assert_eq!(
            prompt_to_jql("find tickets about onboarding in project ABC"),
            r#"project = "ABC" AND text ~ "onboarding""#
        );
    }

    #[test]
    fn test_project_key_is_upper_cased() {
        assert_eq!(
            prompt_to_jql("list bugs In Project web-2"),
            r#"project = "WEB-2""#
        );
    }

    #[test]
    fn test_topic_stops_at_assignee_and_punctuation() {
        assert_eq!(
            prompt_to_jql("open issues related to the login flow assigned to alice."),
            r#"text ~ "login flow" AND status in ("Open", "In Progress") AND assignee = "alice""#
        );
        assert_eq!(
            prompt_to_jql("anything regarding billing export?"),
            r#"text ~ "billing export""#
        );
    }

    #[test]
    fn test_closed_status() {
        assert_eq!(
            prompt_to_jql("show done tickets"),
            r#"status in ("Done", "Closed")"#
        );
    }

    #[test]
    fn test_status_needs_whole_word() {
        // "reopened" is neither open nor closed
        assert_eq!(prompt_to_jql("reopened bugs"), r#"text ~ "reopened bugs""#);
    }

    #[test]
    fn test_fallback_is_whole_prompt() {
        assert_eq!(
            prompt_to_jql("  Payment \"Gateway\"  timeouts "),
            r#"text ~ "payment gateway timeouts""#
        );
    }

    #[test]
    fn test_on_inside_word_is_not_a_topic_marker() {
        // "onboarding" must not split into "on" + "boarding"
        assert_eq!(prompt_to_jql("onboarding checklist"), r#"text ~ "onboarding checklist""#);
    }
}
