//! Language model adapters
//!
//! - [`OpenAiGateway`]: chat completions with function calling, used for tool
//!   selection, finalization and clarifying questions.
//! - [`OllamaIntentModel`]: a local generation model used only for intent
//!   classification, streamed line by line.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaIntentModel;
pub use openai::OpenAiGateway;

use switchboard_application::GatewayError;

/// Map a transport failure onto the gateway error the classifier branches on.
pub(crate) fn transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}
