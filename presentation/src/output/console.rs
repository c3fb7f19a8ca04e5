//! Console output formatter for prompt responses

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use std::collections::BTreeMap;
use switchboard_domain::core::string::truncate;
use switchboard_domain::search::SearchResponse;
use switchboard_domain::{IntegrationStatus, PromptResponse};

/// Longest message text shown per match.
const MAX_SNIPPET: usize = 200;

/// Formats responses for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force colors off (or back to terminal detection) for all output.
    pub fn set_color_enabled(enabled: bool) {
        if enabled {
            colored::control::unset_override();
        } else {
            colored::control::set_override(false);
        }
    }

    pub fn format(response: &PromptResponse) -> String {
        match response {
            PromptResponse::Message { message } => format!("{}\n", message),
            PromptResponse::SystemStatus { system_status } => Self::format_status(system_status),
            PromptResponse::Search(search) => Self::format_search(search),
        }
    }

    pub fn format_status(status: &BTreeMap<String, IntegrationStatus>) -> String {
        let mut output = format!("{}\n", "Integration status".cyan().bold());
        if status.is_empty() {
            output.push_str("  (no providers registered)\n");
        }

        for (provider, state) in status {
            let line = if let Some(error) = &state.error {
                format!("{} {:<8} {}", "!".red().bold(), provider, error.red())
            } else if !state.connected {
                format!("{} {:<8} {}", "○".dimmed(), provider, "not connected".dimmed())
            } else {
                let mut detail = String::from("connected");
                if let Some(user) = &state.provider_user_id {
                    detail.push_str(&format!(" as {}", user));
                }
                match (state.token_valid, &state.token_expires_at) {
                    (Some(true), Some(expiry)) => detail.push_str(&format!(", token valid until {}", expiry)),
                    (Some(false), _) => detail.push_str(", token expired"),
                    _ => {}
                }
                format!("{} {:<8} {}", "●".green().bold(), provider, detail)
            };
            output.push_str(&format!("  {}\n", line));
        }
        output
    }

    pub fn format_search(search: &SearchResponse) -> String {
        let mut output = format!(
            "{} {} ({} {})\n",
            "Results for:".cyan().bold(),
            search.query,
            search.match_count,
            if search.match_count == 1 { "match" } else { "matches" }
        );

        if !search.slack_matches.is_empty() {
            output.push_str(&Self::section_header("Slack"));
            for m in &search.slack_matches {
                output.push_str(&format!(
                    "  * {} {}\n    {}\n",
                    truncate(&m.text, MAX_SNIPPET),
                    format!("({} in {})", m.user, m.channel_type).dimmed(),
                    m.permalink.blue()
                ));
            }
        }

        if !search.jira_matches.is_empty() {
            output.push_str(&Self::section_header("Jira"));
            for m in &search.jira_matches {
                output.push_str(&format!(
                    "  * {} {} {}\n    {}\n",
                    m.key.yellow().bold(),
                    m.summary,
                    format!("[{}]", m.status).dimmed(),
                    m.permalink.blue()
                ));
            }
        }

        if !search.notion_matches.is_empty() {
            output.push_str(&Self::section_header("Notion"));
            for m in &search.notion_matches {
                output.push_str(&format!("  * {}", m.title.bold()));
                if !m.last_edited.is_empty() {
                    output.push_str(&format!(" {}", format!("(edited {})", m.last_edited).dimmed()));
                }
                output.push('\n');
                if !m.summary.is_empty() {
                    output.push_str(&format!("    {}\n", truncate(&m.summary, MAX_SNIPPET)));
                }
                output.push_str(&format!("    {}\n", m.permalink.blue()));
            }
        }

        if !search.auth_hints.is_empty() {
            output.push_str(&Self::section_header("Not connected"));
            for hint in &search.auth_hints {
                output.push_str(&format!("  * {}: {}\n", hint.provider, hint.auth_url.blue()));
            }
        }

        output
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", title.cyan().bold())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, response: &PromptResponse) -> String {
        Self::format(response)
    }
}
