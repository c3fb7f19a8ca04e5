//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored text
    Text,
    /// The response object as JSON
    Json,
}

/// CLI arguments for switchboard
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(author, version, about = "Route a question to Slack, Jira and Notion and fold the answers into one reply")]
#[command(long_about = r#"
Switchboard classifies your request, picks the provider tools that can answer
it from the live tool registry, runs them in parallel and folds the results
into a single response.

Configuration files are loaded from (in priority order):
1. --config <path>          Explicit config file
2. ./switchboard.toml       Project-level config
3. ~/.config/switchboard/config.toml   Global config

Example:
  switchboard "find tickets about onboarding in project ABC"
  switchboard --status --user alice
  switchboard --chat
"#)]
pub struct Cli {
    /// The request to handle (not required in chat or status mode)
    pub prompt: Option<String>,

    /// App user id the request is made for
    #[arg(short, long, value_name = "ID", default_value = "local-user")]
    pub user: String,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Show integration status for the user and exit
    #[arg(long)]
    pub status: bool,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_prompt() {
        let cli = Cli::parse_from(["switchboard", "-vv", "--user", "alice", "find roadmap docs"]);
        assert_eq!(cli.prompt.as_deref(), Some("find roadmap docs"));
        assert_eq!(cli.user, "alice");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, None);
        assert!(!cli.chat);
    }

    #[test]
    fn test_modes_and_output() {
        let cli = Cli::parse_from(["switchboard", "--status", "-o", "json"]);
        assert!(cli.status);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.prompt, None);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["switchboard", "--output", "yaml", "hi"]).is_err());
    }
}
