//! OAuth clients for the providers that issue per-user tokens.
//!
//! Each client builds the provider's authorization URL and runs the
//! refresh-token grant. The authorization-code exchange itself is handled by
//! the web callback outside this workspace.

pub mod jira;
pub mod slack;

pub use jira::JiraOAuth;
pub use slack::SlackOAuth;

use switchboard_application::OAuthError;

pub(crate) fn transport_error(error: reqwest::Error) -> OAuthError {
    OAuthError::Transport(error.to_string())
}

/// Build `base?k=v&...`, or an empty string when the base is unusable.
pub(crate) fn url_with_query(base: &str, pairs: &[(&str, &str)]) -> String {
    match reqwest::Url::parse_with_params(base, pairs) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("Invalid authorization base {}: {}", base, e);
            String::new()
        }
    }
}
