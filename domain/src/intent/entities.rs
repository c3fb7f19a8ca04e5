//! Intent entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Classified purpose of a user prompt (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Greetings and chit-chat
    Smalltalk,
    /// Not enough information to act on
    Ambiguous,
    /// Request to summarize something
    Summarize,
    /// Questions about connected integrations and permissions
    SystemStatus,
    /// Retrieval of data from connected providers
    SearchData,
    /// Any other actionable request (create, update, comment, ...)
    #[serde(rename = "other", alias = "other_actionable")]
    OtherActionable,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::Smalltalk,
        Intent::Ambiguous,
        Intent::Summarize,
        Intent::SystemStatus,
        Intent::SearchData,
        Intent::OtherActionable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Smalltalk => "smalltalk",
            Intent::Ambiguous => "ambiguous",
            Intent::Summarize => "summarize",
            Intent::SystemStatus => "system_status",
            Intent::SearchData => "search_data",
            Intent::OtherActionable => "other",
        }
    }

    /// Intents that are answered without touching any provider.
    pub fn short_circuits(&self) -> bool {
        matches!(
            self,
            Intent::Smalltalk | Intent::Ambiguous | Intent::Summarize | Intent::SystemStatus
        )
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Intent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "smalltalk" | "chat_smalltalk" => Ok(Intent::Smalltalk),
            "ambiguous" => Ok(Intent::Ambiguous),
            "summarize" | "summary" => Ok(Intent::Summarize),
            "system_status" => Ok(Intent::SystemStatus),
            "search_data" | "search" => Ok(Intent::SearchData),
            "other" | "other_actionable" | "actionable" => Ok(Intent::OtherActionable),
            _ => Err(DomainError::UnknownIntent(s.to_string())),
        }
    }
}

/// Result of classifying a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    /// Diagnostic explanation (model reasoning or heuristic rule)
    #[serde(default)]
    pub reasoning: String,
}

impl Classification {
    pub fn new(intent: Intent, reasoning: impl Into<String>) -> Self {
        Self {
            intent,
            reasoning: reasoning.into(),
        }
    }

    /// Degraded classification used whenever the model output cannot be trusted.
    pub fn ambiguous(reasoning: impl Into<String>) -> Self {
        Self::new(Intent::Ambiguous, reasoning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_round_trip_names() {
        for intent in Intent::ALL {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
    }

    #[test]
    fn test_intent_aliases() {
        assert_eq!("chat_smalltalk".parse::<Intent>().unwrap(), Intent::Smalltalk);
        assert_eq!("Other-Actionable".parse::<Intent>().unwrap(), Intent::OtherActionable);
        assert_eq!(" SEARCH_DATA ".parse::<Intent>().unwrap(), Intent::SearchData);
        assert!("weather".parse::<Intent>().is_err());
    }

    #[test]
    fn test_intent_serde() {
        let json = serde_json::to_string(&Intent::OtherActionable).unwrap();
        assert_eq!(json, "\"other\"");
        let parsed: Intent = serde_json::from_str("\"system_status\"").unwrap();
        assert_eq!(parsed, Intent::SystemStatus);
    }

    #[test]
    fn test_short_circuits() {
        assert!(Intent::Smalltalk.short_circuits());
        assert!(Intent::SystemStatus.short_circuits());
        assert!(!Intent::SearchData.short_circuits());
        assert!(!Intent::OtherActionable.short_circuits());
    }
}
