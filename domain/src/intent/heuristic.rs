//! Keyword and sentence-shape intent rules.
//!
//! Rule order matters: system-status keywords are checked first so that a
//! status question is never routed into a data search.

use super::entities::{Classification, Intent};
use crate::core::string::normalize_prompt;
use regex::Regex;
use std::sync::LazyLock;

const SYSTEM_STATUS_KEYWORDS: &[&str] = &[
    "connected",
    "scopes",
    "authorize",
    "linked",
    "integration",
    "status",
    "which tools",
    "what integrations",
    "what providers",
    "what is connected",
    "are you linked",
    "active integrations",
    "available integrations",
    "show connections",
    "list connections",
    "what can you access",
    "what can you do",
    "permissions",
    "access",
    "auth",
    "what accounts",
    "which accounts",
    "which services",
    "what services",
    "what apps",
    "which apps",
    "what bots",
    "which bots",
];

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

#[allow(clippy::expect_used)]
static REQUEST_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(who|what|when|where|why|how|can|should|does|do|pull|give|bring|is|are|could|would|will|did|please|find|show|list|search|get|fetch|look)\b",
    )
    .expect("request shape regex")
});

/// Classify with keyword and shape rules only. Never fails.
pub fn classify_heuristic(prompt: &str) -> Classification {
    let text = normalize_prompt(prompt);
    if text.is_empty() {
        return Classification::ambiguous("heuristic: empty prompt");
    }

    if let Some(keyword) = SYSTEM_STATUS_KEYWORDS.iter().find(|kw| text.contains(*kw)) {
        return Classification::new(
            Intent::SystemStatus,
            format!("heuristic: system status keyword '{}'", keyword),
        );
    }

    if is_greeting(&text) {
        return Classification::new(Intent::Smalltalk, "heuristic: greeting");
    }

    if text.contains("summarize") || text.contains("summary") {
        return Classification::new(Intent::Summarize, "heuristic: summary keyword");
    }

    if text.ends_with('?') || REQUEST_SHAPE.is_match(&text) {
        return Classification::new(Intent::SearchData, "heuristic: question or request shape");
    }

    if text.split(' ').count() < 3 {
        return Classification::ambiguous("heuristic: short input");
    }

    Classification::ambiguous("heuristic: no rule matched")
}

/// Cheap pre-check answered without any model call.
///
/// Only covers cases where no model could do better: empty input and exact
/// greetings.
pub fn fast_path(prompt: &str) -> Option<Classification> {
    let text = normalize_prompt(prompt);
    if text.is_empty() {
        return Some(Classification::ambiguous("fast path: empty prompt"));
    }
    if is_greeting(&text) {
        return Some(Classification::new(Intent::Smalltalk, "fast path: greeting"));
    }
    None
}

fn is_greeting(normalized: &str) -> bool {
    let trimmed = normalized.trim_end_matches(['!', '.', ',']);
    GREETINGS.contains(&trimmed)
}
