//! Ollama-compatible local intent model
//!
//! The model server may not be running when the first prompt arrives. The
//! adapter probes `/api/tags`, can launch the configured start command once,
//! and streams `/api/generate` output as newline-delimited JSON.

use super::transport_error;
use crate::config::FileIntentConfig;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::process::Stdio;
use std::time::Duration;
use switchboard_application::{GatewayError, IntentModel, StreamHandle};
use switchboard_domain::StreamEvent;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const STREAM_BUFFER: usize = 64;

pub struct OllamaIntentModel {
    client: Client,
    probe_client: Client,
    base_url: String,
    model: String,
    start_command: Vec<String>,
    startup_grace: Duration,
}

impl OllamaIntentModel {
    pub fn new(config: &FileIntentConfig) -> Result<Self, GatewayError> {
        let build = |secs: u64| {
            Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()
                .map_err(|e| GatewayError::Other(e.to_string()))
        };

        Ok(Self {
            client: build(config.timeout_seconds)?,
            probe_client: build(config.probe_timeout_seconds)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            start_command: config.start_command.clone(),
            startup_grace: Duration::from_millis(config.startup_grace_millis),
        })
    }
}

/// One line of `/api/generate` streaming output.
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Map one NDJSON line to zero or more stream events.
pub(crate) fn parse_generate_line(line: &str) -> Vec<StreamEvent> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    let chunk: GenerateChunk = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(e) => return vec![StreamEvent::Error(format!("bad stream line: {}", e))],
    };
    if let Some(error) = chunk.error {
        return vec![StreamEvent::Error(error)];
    }

    let mut events = Vec::new();
    if !chunk.response.is_empty() {
        events.push(StreamEvent::Delta(chunk.response));
    }
    if chunk.done {
        events.push(StreamEvent::Completed(String::new()));
    }
    events
}

/// Split complete lines off the front of `buffer`.
///
/// Lines are decoded only once complete, so a character split across two
/// network chunks survives intact.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
    }
    lines
}

#[async_trait]
impl IntentModel for OllamaIntentModel {
    async fn is_ready(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.probe_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Intent model probe failed: {}", e);
                false
            }
        }
    }

    async fn warm_up(&self) -> Result<(), GatewayError> {
        let Some((program, args)) = self.start_command.split_first() else {
            return Err(GatewayError::ConnectionError(
                "no start command configured".to_string(),
            ));
        };

        info!("Starting intent model server: {}", self.start_command.join(" "));
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| GatewayError::ConnectionError(format!("{}: {}", program, e)))?;

        tokio::time::sleep(self.startup_grace).await;

        if self.is_ready().await {
            Ok(())
        } else {
            Err(GatewayError::ConnectionError(format!(
                "intent model not reachable at {} after start",
                self.base_url
            )))
        }
    }

    async fn generate(&self, prompt: &str) -> Result<StreamHandle, GatewayError> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "prompt": prompt, "stream": true }))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(GatewayError::ModelNotAvailable(self.model.clone())),
            s => {
                return Err(GatewayError::RequestFailed(format!(
                    "HTTP {} from intent model",
                    s.as_u16()
                )));
            }
        }

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let mut stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut buffer: Vec<u8> = Vec::new();
            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Intent model stream interrupted: {}", e);
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                buffer.extend_from_slice(&bytes);

                for line in drain_lines(&mut buffer) {
                    for event in parse_generate_line(&line) {
                        let terminal = event.is_terminal();
                        if tx.send(event).await.is_err() || terminal {
                            return;
                        }
                    }
                }
            }
            for event in parse_generate_line(&String::from_utf8_lossy(&buffer)) {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        });

        Ok(StreamHandle::new(rx))
    }
}
