//! Integration token entities

use super::keys::EXPIRY_SKEW_SECONDS;
use crate::core::error::DomainError;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// OAuth token set for one (app user, provider) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationToken {
    /// Internal app user id
    pub user_id: String,
    /// The provider's id for the same person (e.g., Slack `U...`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_user_id: Option<String>,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Provider-side resource the token is bound to (e.g., Jira cloud id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl IntegrationToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && self.expires_at > now
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// New token generation after a refresh grant.
    ///
    /// Identity fields are kept. A grant without a refresh token keeps the
    /// previous one.
    pub fn refreshed(&self, grant: TokenGrant, now: DateTime<Utc>) -> Self {
        let expires_at = grant.expires_at(now);
        Self {
            user_id: self.user_id.clone(),
            provider_user_id: grant.provider_user_id.or_else(|| self.provider_user_id.clone()),
            access_token: grant.access_token,
            refresh_token: grant.refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at,
            scope: grant.scope.or_else(|| self.scope.clone()),
            resource_id: self.resource_id.clone(),
        }
    }

    /// Durable row shape.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("user_id".into(), json!(self.user_id));
        row.insert("provider_user_id".into(), json!(self.provider_user_id));
        row.insert("access_token".into(), json!(self.access_token));
        row.insert("refresh_token".into(), json!(self.refresh_token));
        row.insert("expires_at".into(), json!(self.expires_at.to_rfc3339()));
        row.insert("scope".into(), json!(self.scope));
        row.insert("resource_id".into(), json!(self.resource_id));
        row
    }

    /// Parse a durable row. `expires_at` may be RFC 3339, a naive ISO
    /// timestamp (taken as UTC), or epoch seconds.
    pub fn from_record(row: &Map<String, Value>) -> Result<Self, DomainError> {
        let text = |key: &str| {
            row.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let user_id = text("user_id")
            .ok_or_else(|| DomainError::InvalidTokenRecord("missing user_id".into()))?;
        let expires_at = row
            .get("expires_at")
            .and_then(parse_timestamp)
            .ok_or_else(|| DomainError::InvalidTokenRecord("missing or bad expires_at".into()))?;

        Ok(Self {
            user_id,
            provider_user_id: text("provider_user_id"),
            access_token: text("access_token").unwrap_or_default(),
            refresh_token: text("refresh_token"),
            expires_at,
            scope: text("scope"),
            resource_id: text("resource_id"),
        })
    }
}

/// Parse a timestamp in any of the formats token rows use.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        _ => None,
    }
}

/// Token endpoint response, normalized across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime reported by the provider, in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub provider_user_id: Option<String>,
}

impl TokenGrant {
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds((self.expires_in - EXPIRY_SKEW_SECONDS).max(0))
    }
}

/// Result of asking for a usable token.
///
/// `AuthRequired` is an ordinary outcome, not a failure: callers branch on it
/// and surface the URL to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLookup {
    Valid(IntegrationToken),
    AuthRequired {
        auth_url: String,
        error: Option<String>,
    },
}

impl TokenLookup {
    pub fn auth_required(auth_url: impl Into<String>) -> Self {
        TokenLookup::AuthRequired {
            auth_url: auth_url.into(),
            error: None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        match self {
            TokenLookup::Valid(token) => Some(&token.access_token),
            TokenLookup::AuthRequired { .. } => None,
        }
    }

    /// `{access_token}` or `{auth_required, auth_url[, error]}`.
    pub fn to_value(&self) -> Value {
        match self {
            TokenLookup::Valid(token) => json!({ "access_token": token.access_token }),
            TokenLookup::AuthRequired { auth_url, error } => {
                let mut value = json!({ "auth_required": true, "auth_url": auth_url });
                if let (Some(error), Some(map)) = (error, value.as_object_mut()) {
                    map.insert("error".into(), json!(error));
                }
                value
            }
        }
    }
}

/// Connection status of one provider for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationStatus {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntegrationStatus {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn from_token(token: &IntegrationToken, now: DateTime<Utc>) -> Self {
        Self {
            connected: true,
            provider_user_id: token.provider_user_id.clone(),
            scopes: token.scope.clone(),
            token_valid: Some(token.is_valid_at(now)),
            token_expires_at: Some(token.expires_at.to_rfc3339()),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: DateTime<Utc>) -> IntegrationToken {
        IntegrationToken {
            user_id: "app-1".into(),
            provider_user_id: Some("U1".into()),
            access_token: "xoxp-old".into(),
            refresh_token: Some("refresh-old".into()),
            expires_at,
            scope: Some("search:read".into()),
            resource_id: None,
        }
    }

    #[test]
    fn test_validity() {
        let now = Utc::now();
        assert!(token(now + Duration::minutes(5)).is_valid_at(now));
        assert!(!token(now - Duration::seconds(1)).is_valid_at(now));

        let mut empty = token(now + Duration::minutes(5));
        empty.access_token.clear();
        assert!(!empty.is_valid_at(now));
    }

    #[test]
    fn test_refreshed_keeps_refresh_token_when_grant_omits_it() {
        let now = Utc::now();
        let grant = TokenGrant {
            access_token: "xoxp-new".into(),
            refresh_token: None,
            expires_in: 3600,
            scope: None,
            provider_user_id: None,
        };
        let refreshed = token(now).refreshed(grant, now);

        assert_eq!(refreshed.access_token, "xoxp-new");
        assert_eq!(refreshed.refresh_token(), Some("refresh-old"));
        assert_eq!(refreshed.scope.as_deref(), Some("search:read"));
        assert_eq!(refreshed.expires_at, now + Duration::seconds(3540));
    }

    #[test]
    fn test_grant_expiry_never_in_the_past() {
        let now = Utc::now();
        let grant = TokenGrant {
            access_token: "t".into(),
            refresh_token: None,
            expires_in: 30,
            scope: None,
            provider_user_id: None,
        };
        assert_eq!(grant.expires_at(now), now);
    }

    #[test]
    fn test_record_round_trip_and_formats() {
        let original = token(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap());
        let parsed = IntegrationToken::from_record(&original.to_record()).unwrap();
        assert_eq!(parsed, original);

        let mut row = original.to_record();
        row.insert("expires_at".into(), json!("2030-01-02T03:04:05.123456"));
        let naive = IntegrationToken::from_record(&row).unwrap();
        assert_eq!(naive.expires_at.timestamp(), original.expires_at.timestamp());

        row.insert("expires_at".into(), json!(1_900_000_000));
        assert_eq!(
            IntegrationToken::from_record(&row).unwrap().expires_at.timestamp(),
            1_900_000_000
        );
    }

    #[test]
    fn test_record_requires_user_and_expiry() {
        let mut row = token(Utc::now()).to_record();
        row.insert("expires_at".into(), json!("tomorrow"));
        assert!(matches!(
            IntegrationToken::from_record(&row),
            Err(DomainError::InvalidTokenRecord(_))
        ));

        let mut row = token(Utc::now()).to_record();
        row.remove("user_id");
        assert!(IntegrationToken::from_record(&row).is_err());
    }

    #[test]
    fn test_lookup_wire_shapes() {
        let valid = TokenLookup::Valid(token(Utc::now()));
        assert_eq!(valid.to_value(), json!({"access_token": "xoxp-old"}));
        assert_eq!(valid.access_token(), Some("xoxp-old"));

        let auth = TokenLookup::AuthRequired {
            auth_url: "https://auth".into(),
            error: Some("invalid_grant".into()),
        };
        assert_eq!(
            auth.to_value(),
            json!({"auth_required": true, "auth_url": "https://auth", "error": "invalid_grant"})
        );
        assert_eq!(
            TokenLookup::auth_required("u").to_value(),
            json!({"auth_required": true, "auth_url": "u"})
        );
    }

    #[test]
    fn test_status_from_token() {
        let now = Utc::now();
        let status = IntegrationStatus::from_token(&token(now - Duration::hours(1)), now);
        assert!(status.connected);
        assert_eq!(status.token_valid, Some(false));
        assert_eq!(status.provider_user_id.as_deref(), Some("U1"));

        let json = serde_json::to_value(IntegrationStatus::disconnected()).unwrap();
        assert_eq!(json, json!({"connected": false}));
    }
}
