//! Intent catalog used to prompt the LLM classifier.

use super::entities::Intent;
use serde::{Deserialize, Serialize};

/// One entry of the intent catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub intent: Intent,
    pub description: String,
    #[serde(default)]
    pub example_prompts: Vec<String>,
}

impl IntentDefinition {
    pub fn new(intent: Intent, description: impl Into<String>) -> Self {
        Self {
            intent,
            description: description.into(),
            example_prompts: Vec::new(),
        }
    }

    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.example_prompts
            .extend(examples.into_iter().map(Into::into));
        self
    }
}

/// Fixed catalog of intents with descriptions and example prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentCatalog {
    definitions: Vec<IntentDefinition>,
}

impl IntentCatalog {
    pub fn new(definitions: Vec<IntentDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[IntentDefinition] {
        &self.definitions
    }

    pub fn intent_names(&self) -> Vec<&'static str> {
        self.definitions.iter().map(|d| d.intent.as_str()).collect()
    }

    /// Render the catalog as a bullet list for the classifier prompt.
    pub fn render_context(&self) -> String {
        let mut lines = vec!["Here are the possible intents:".to_string()];
        for def in &self.definitions {
            lines.push(format!("- {}: {}", def.intent, def.description));
            if !def.example_prompts.is_empty() {
                lines.push("  Examples:".to_string());
                for example in &def.example_prompts {
                    lines.push(format!("    - {}", example));
                }
            }
        }
        lines.join("\n")
    }

    /// Few-shot block built from the first `n` examples of each intent.
    pub fn few_shot_examples(&self, n: usize) -> String {
        let mut lines = Vec::new();
        for def in &self.definitions {
            for example in def.example_prompts.iter().take(n) {
                lines.push(format!("User: \"{}\"", example));
                lines.push(
                    serde_json::json!({
                        "intent": def.intent.as_str(),
                        "reasoning": format!("User intent: {}", def.description),
                    })
                    .to_string(),
                );
            }
        }
        lines.join("\n")
    }
}

impl Default for IntentCatalog {
    fn default() -> Self {
        Self::new(vec![
            IntentDefinition::new(
                Intent::Smalltalk,
                "Greetings, thanks and casual conversation that needs no data.",
            )
            .with_examples(["hi", "good morning", "thanks, that's all"]),
            IntentDefinition::new(
                Intent::Ambiguous,
                "Too vague to act on; the assistant should ask a clarifying question.",
            )
            .with_examples(["that thing", "can you check it", "stuff from yesterday"]),
            IntentDefinition::new(
                Intent::Summarize,
                "Asks for a summary of a conversation, page, thread or document.",
            )
            .with_examples(["summarize this", "give me a summary of the standup notes"]),
            IntentDefinition::new(
                Intent::SystemStatus,
                "Asks which integrations are connected, authorized or available.",
            )
            .with_examples(["is slack connected?", "which integrations do I have"]),
            IntentDefinition::new(
                Intent::SearchData,
                "Looks up messages, pages or tickets in connected tools.",
            )
            .with_examples([
                "What were the meeting notes from the last standup?",
                "find tickets about onboarding in project ABC",
                "show me slack messages about the launch",
            ]),
            IntentDefinition::new(
                Intent::OtherActionable,
                "Asks to perform an action such as creating, updating or commenting on an item.",
            )
            .with_examples([
                "create a jira ticket for the login bug",
                "add a comment to PROJ-12 saying it is fixed",
            ]),
        ])
    }
}
