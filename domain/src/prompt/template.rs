//! Prompt templates for classification, tool selection and finalization

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Full prompt for the intent model.
    pub fn classification_prompt(
        catalog_context: &str,
        intent_names: &[&str],
        few_shot: &str,
        prompt: &str,
    ) -> String {
        format!(
            r#"You are an intent classifier for a multi-provider assistant.

{}

When given a user prompt, output only a single JSON object with the following fields:
- intent: one of [{}]
- reasoning: a short explanation

Do not output anything except the JSON object. Do not explain, apologize, or add any extra text.

{}

User: "{}""#,
            catalog_context,
            intent_names.join(", "),
            few_shot,
            prompt
        )
    }

    /// System prompt for choosing tool calls from a manifest
    pub fn tool_selection_system() -> &'static str {
        r#"You are a helpful assistant.
Follow the tool structure and parameter schema exactly as defined in the tool manifest.
If a parameter (e.g., 'query') requires a single word, do not use a sentence.
Respect any specified format in tool descriptions or parameter schemas.
When returning a link (e.g., a Notion page), offer to summarize its content.
If the user mentions a conversation or thread, offer to summarize it.
Format output for Slack: use Slack hyperlinks (<url|text>), avoid excessive markdown, and keep it clean."#
    }

    /// System prompt for turning tool results into a reply
    pub fn finalize_system() -> &'static str {
        r#"You are a helpful assistant. Summarize and format the following tool results for a Slack user.
If the user's request is ambiguous or lacks context, ask a clarifying question before proceeding.
If you return a link (e.g., to a Notion page), offer to summarize its content.
If the user references a conversation or thread, offer to summarize it.
Always offer a follow-up question, such as 'Would you like a summary of this page?' or 'Is there anything else I can help with?'.
Format your output for Slack: use Slack hyperlinks (<url|text>), avoid excessive stars, hashtags, or markdown headers, and keep formatting clean."#
    }

    /// Assistant turn carrying the serialized tool results
    pub fn finalize_results(results_json: &str) -> String {
        format!("Tool results: {}", results_json)
    }

    pub fn assistant_system() -> &'static str {
        "You are a helpful, friendly assistant."
    }

    /// Ask for one clarifying question about an ambiguous prompt
    pub fn clarifying_prompt(prompt: &str) -> String {
        format!(
            "A user sent the following message to a chatbot: '{}'. \
             Reply with a friendly, engaging clarifying question or ask for more details. \
             Do not answer the question, just ask for clarification.",
            prompt
        )
    }
}
