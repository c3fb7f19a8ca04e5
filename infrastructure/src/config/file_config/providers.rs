//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};

/// Slack OAuth app and Web API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSlackConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    /// Web API base URL.
    pub api_base: String,
    /// OAuth v2 authorize page.
    pub authorize_base: String,
    pub bot_scopes: String,
    pub user_scopes: String,
    /// Messages authored by this account are excluded from search results.
    pub service_account: String,
}

impl Default for FileSlackConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            api_base: "https://slack.com/api".to_string(),
            authorize_base: "https://slack.com/oauth/v2/authorize".to_string(),
            bot_scopes: "app_mentions:read,assistant:write,files:read,im:read".to_string(),
            user_scopes: "channels:read,groups:read,im:read,mpim:read,users:read,im:history,groups:history,channels:history,search:read".to_string(),
            service_account: "uni-app".to_string(),
        }
    }
}

impl FileSlackConfig {
    /// OAuth is usable only with a client id and secret.
    pub fn oauth_configured(&self) -> bool {
        is_set(&self.client_id) && is_set(&self.client_secret)
    }
}

/// Jira Cloud (Atlassian OAuth 2.0 3LO) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileJiraConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    /// REST gateway; issue endpoints live under `/ex/jira/<cloud id>`.
    pub api_base: String,
    /// Authorize page and token endpoint host.
    pub auth_base: String,
    pub scopes: String,
}

impl Default for FileJiraConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            api_base: "https://api.atlassian.com".to_string(),
            auth_base: "https://auth.atlassian.com".to_string(),
            scopes: "read:jira-user read:jira-work write:jira-work offline_access".to_string(),
        }
    }
}

impl FileJiraConfig {
    pub fn oauth_configured(&self) -> bool {
        is_set(&self.client_id) && is_set(&self.client_secret)
    }
}

/// Notion internal integration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNotionConfig {
    /// Environment variable name for the integration token (default: "NOTION_API_KEY").
    pub token_env: String,
    /// Direct integration token (not recommended, use the env var instead).
    pub token: Option<String>,
    pub api_base: String,
    /// `Notion-Version` header.
    pub api_version: String,
}

impl Default for FileNotionConfig {
    fn default() -> Self {
        Self {
            token_env: "NOTION_API_KEY".to_string(),
            token: None,
            api_base: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
        }
    }
}

impl FileNotionConfig {
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(&self.token_env).ok())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub slack: FileSlackConfig,
    pub jira: FileJiraConfig,
    pub notion: FileNotionConfig,
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
