//! Handle Prompt use case.
//!
//! The top-level request pipeline:
//!
//! 1. Classify the intent
//! 2. Short-circuit conversational intents (greeting, clarification,
//!    summarize without a target, integration status)
//! 3. Detect providers named in the prompt and build the tool manifest
//! 4. Ask the LLM to select tools, backfilling the default search tools
//! 5. Dispatch every call concurrently
//! 6. Aggregate (search) or summarize with the LLM (everything else)

use super::classify_intent::IntentClassifier;
use super::dispatch_tools::ToolDispatcher;
use super::token_store::TokenStore;
use super::tool_catalog::{CatalogError, ToolCatalog};
use crate::config::PipelineParams;
use crate::ports::llm_gateway::LlmGateway;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use switchboard_domain::core::string::truncate;
use switchboard_domain::response::{CLARIFY_FALLBACK, GREETING_REPLY, SUMMARIZE_REPLY};
use switchboard_domain::search::entities::NOTHING_FOUND;
use switchboard_domain::{
    Intent, Message, PromptResponse, PromptTemplate, SearchAggregator, ToolCall, ToolResult,
    clean_output,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while handling a prompt.
///
/// Only startup-class failures surface here; provider, model and
/// authorization problems are folded into the response.
#[derive(Error, Debug)]
pub enum HandlePromptError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Input for the [`HandlePromptUseCase`].
#[derive(Debug, Clone)]
pub struct HandlePromptInput {
    pub prompt: String,
    /// Internal app user id
    pub user_id: String,
}

impl HandlePromptInput {
    pub fn new(prompt: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            user_id: user_id.into(),
        }
    }
}

pub struct HandlePromptUseCase {
    classifier: Arc<IntentClassifier>,
    catalog: Arc<ToolCatalog>,
    dispatcher: Arc<ToolDispatcher>,
    tokens: Arc<TokenStore>,
    llm: Arc<dyn LlmGateway>,
    aggregator: SearchAggregator,
}

impl HandlePromptUseCase {
    pub fn new(
        classifier: Arc<IntentClassifier>,
        catalog: Arc<ToolCatalog>,
        dispatcher: Arc<ToolDispatcher>,
        tokens: Arc<TokenStore>,
        llm: Arc<dyn LlmGateway>,
        params: &PipelineParams,
    ) -> Self {
        Self {
            classifier,
            catalog,
            dispatcher,
            tokens,
            llm,
            aggregator: SearchAggregator::new(params.service_account.clone()),
        }
    }

    pub async fn execute(&self, input: HandlePromptInput) -> Result<PromptResponse, HandlePromptError> {
        let prompt = input.prompt.as_str();
        info!("Handling prompt: {}", truncate(prompt, 100));

        let classification = self.classifier.classify(prompt).await;
        info!(
            intent = %classification.intent,
            "Detected intent: {} | Reasoning: {}",
            classification.intent,
            classification.reasoning
        );

        match classification.intent {
            Intent::Smalltalk => Ok(PromptResponse::message(GREETING_REPLY)),
            Intent::Ambiguous => Ok(self.clarify(prompt).await),
            Intent::SystemStatus => self.status(&input.user_id).await,
            Intent::Summarize => {
                let providers = self.catalog.detect_providers(prompt).await?;
                if providers.is_empty() {
                    return Ok(PromptResponse::message(SUMMARIZE_REPLY));
                }
                self.run_tools(Intent::Summarize, prompt, &input.user_id, providers).await
            }
            intent @ (Intent::SearchData | Intent::OtherActionable) => {
                let providers = self.catalog.detect_providers(prompt).await?;
                self.run_tools(intent, prompt, &input.user_id, providers).await
            }
        }
    }

    /// Connection status of every registered provider for `user_id`.
    pub async fn status(&self, user_id: &str) -> Result<PromptResponse, HandlePromptError> {
        let providers = self.catalog.providers().await?;
        let status = self.tokens.integration_status(user_id, &providers).await;
        Ok(PromptResponse::SystemStatus { system_status: status })
    }

    async fn run_tools(
        &self,
        intent: Intent,
        prompt: &str,
        user_id: &str,
        providers: Vec<String>,
    ) -> Result<PromptResponse, HandlePromptError> {
        let started = Instant::now();
        info!("Detected providers: {:?}", providers);

        let manifest = self.catalog.build_manifest(Some(user_id), &providers).await?;
        debug!("Manifest offered to tool selection: {} tools", manifest.len());
        let manifest_done = Instant::now();

        let messages = [
            Message::system(PromptTemplate::tool_selection_system()),
            Message::user(prompt),
        ];
        let mut calls = match self.llm.select_tools(&messages, &manifest).await {
            Ok(calls) => calls,
            Err(e) => {
                warn!("Tool selection failed, continuing with default tools: {}", e);
                Vec::new()
            }
        };
        info!(
            "Selected tools: {:?}",
            calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
        );

        if providers.is_empty() {
            let selected: HashSet<String> = calls.iter().map(|c| c.name.clone()).collect();
            let missing: Vec<ToolCall> = self
                .catalog
                .primary_search_tools(Some(user_id))
                .await?
                .into_iter()
                .filter(|tool| !selected.contains(&tool.name))
                .map(|tool| ToolCall::new(tool.name).with_param("query", prompt))
                .collect();
            if !missing.is_empty() {
                info!(
                    "Adding missing primary tools: {:?}",
                    missing.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
                );
                calls.extend(missing);
            }
        }

        if calls.is_empty() {
            info!("No tool calls selected, falling back to primary search tools");
            calls = self
                .catalog
                .primary_search_tools(Some(user_id))
                .await?
                .into_iter()
                .map(|tool| ToolCall::new(tool.name).with_param("query", prompt))
                .collect();
        }
        let selection_done = Instant::now();

        let results = self.dispatcher.dispatch(calls, prompt, user_id).await;
        let dispatch_done = Instant::now();

        let response = if intent == Intent::SearchData {
            PromptResponse::from_search(self.aggregator.aggregate(&results, prompt))
        } else {
            PromptResponse::message(self.finalize(prompt, &results).await)
        };

        let end = Instant::now();
        info!(
            "TIMING: manifest={:.2}s, selection={:.2}s, dispatch={:.2}s, finalize={:.2}s, total={:.2}s",
            (manifest_done - started).as_secs_f64(),
            (selection_done - manifest_done).as_secs_f64(),
            (dispatch_done - selection_done).as_secs_f64(),
            (end - dispatch_done).as_secs_f64(),
            (end - started).as_secs_f64(),
        );
        Ok(response)
    }

    async fn clarify(&self, prompt: &str) -> PromptResponse {
        let messages = [
            Message::system(PromptTemplate::assistant_system()),
            Message::user(PromptTemplate::clarifying_prompt(prompt)),
        ];
        match self.llm.chat(&messages).await {
            Ok(reply) if !reply.trim().is_empty() => PromptResponse::message(reply.trim()),
            Ok(_) => PromptResponse::message(CLARIFY_FALLBACK),
            Err(e) => {
                warn!("Clarifying question failed: {}", e);
                PromptResponse::message(CLARIFY_FALLBACK)
            }
        }
    }

    /// Natural-language summary of the tool results.
    async fn finalize(&self, prompt: &str, results: &[ToolResult]) -> String {
        if !results.is_empty() {
            let payload = serde_json::to_string(results).unwrap_or_default();
            let messages = [
                Message::system(PromptTemplate::finalize_system()),
                Message::user(prompt),
                Message::assistant(PromptTemplate::finalize_results(&payload)),
            ];
            match self.llm.chat(&messages).await {
                Ok(reply) if !reply.trim().is_empty() => return clean_output(&reply),
                Ok(_) => warn!("Finalize returned no content, using raw results"),
                Err(e) => warn!("Finalize failed, using raw results: {}", e),
            }
        }

        let joined = results
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.clone().into_value().to_string())
            .collect::<Vec<_>>()
            .join("\n\n");
        let cleaned = clean_output(&joined);
        if cleaned.is_empty() {
            NOTHING_FOUND.to_string()
        } else {
            cleaned
        }
    }
}
