//! Output formatter trait

use crate::cli::commands::OutputFormat;
use crate::output::console::ConsoleFormatter;
use switchboard_domain::PromptResponse;

/// Trait for rendering a prompt response
pub trait OutputFormatter: Send + Sync {
    fn format(&self, response: &PromptResponse) -> String;
}

/// Pretty-printed JSON, the same shape a web client would receive.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, response: &PromptResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_formatter() {
        let out = JsonFormatter.format(&PromptResponse::message("hello"));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!({"message": "hello"}));
    }
}
