//! OpenAI-compatible chat completions adapter

use super::transport_error;
use crate::config::FileLlmConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use switchboard_application::{GatewayError, LlmGateway};
use switchboard_domain::{Message, Parameters, ToolCall, ToolDescriptor};
use tracing::{debug, warn};

pub struct OpenAiGateway {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiGateway {
    pub fn new(config: &FileLlmConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;

        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!(
                "No API key for the chat model (set llm.api_key or {})",
                config.api_key_env
            );
        }

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    async fn complete(&self, body: Value) -> Result<Value, GatewayError> {
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        match status {
            s if s.is_success() => serde_json::from_str(&text)
                .map_err(|e| GatewayError::InvalidResponse(e.to_string())),
            StatusCode::NOT_FOUND => Err(GatewayError::ModelNotAvailable(self.model.clone())),
            s => Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                s.as_u16(),
                switchboard_domain::core::string::truncate(&text, 300)
            ))),
        }
    }
}

/// Request body for a completion, optionally offering tools.
pub(crate) fn request_body(
    model: &str,
    temperature: f32,
    messages: &[Message],
    tools: &[ToolDescriptor],
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
    });
    if !tools.is_empty() {
        body["tools"] = Value::Array(tools.iter().map(function_definition).collect());
        body["tool_choice"] = json!("auto");
    }
    body
}

fn function_definition(tool: &ToolDescriptor) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters_schema,
        }
    })
}

fn first_message(response: &Value) -> Result<&Value, GatewayError> {
    response
        .pointer("/choices/0/message")
        .ok_or_else(|| GatewayError::InvalidResponse("missing choices[0].message".to_string()))
}

pub(crate) fn parse_content(response: &Value) -> Result<String, GatewayError> {
    Ok(first_message(response)?
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

/// Tool calls chosen by the model. Arguments arrive as a JSON string; a call
/// whose arguments do not parse into an object keeps an empty parameter map.
pub(crate) fn parse_tool_calls(response: &Value) -> Result<Vec<ToolCall>, GatewayError> {
    let Some(calls) = first_message(response)?
        .get("tool_calls")
        .and_then(Value::as_array)
    else {
        return Ok(Vec::new());
    };

    Ok(calls
        .iter()
        .filter_map(|call| {
            let function = call.get("function")?;
            let name = function.get("name")?.as_str()?;
            let parameters = match function.get("arguments") {
                Some(Value::String(raw)) => serde_json::from_str::<Parameters>(raw)
                    .unwrap_or_else(|e| {
                        warn!(tool = %name, "Discarding unparseable tool arguments: {}", e);
                        Parameters::new()
                    }),
                Some(Value::Object(map)) => map.clone(),
                _ => Parameters::new(),
            };
            Some(ToolCall::new(name).with_parameters(parameters))
        })
        .collect())
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn chat(&self, messages: &[Message]) -> Result<String, GatewayError> {
        let body = request_body(&self.model, self.temperature, messages, &[]);
        let response = self.complete(body).await?;
        parse_content(&response)
    }

    async fn select_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> Result<Vec<ToolCall>, GatewayError> {
        let body = request_body(&self.model, self.temperature, messages, tools);
        let response = self.complete(body).await?;
        let calls = parse_tool_calls(&response)?;
        debug!("Model selected {} tool call(s)", calls.len());
        Ok(calls)
    }
}
