//! Intent classification use case.
//!
//! The intent model is asked first; every way it can fail degrades to the
//! keyword heuristic or to `ambiguous`. Classification never returns an
//! error to the pipeline.

use crate::ports::intent_model::IntentModel;
use crate::ports::llm_gateway::GatewayError;
use std::sync::{Arc, OnceLock};
use switchboard_domain::intent::{classify_heuristic, fast_path, parse_classification};
use switchboard_domain::{Classification, IntentCatalog, PromptTemplate};
use tracing::{debug, info, warn};

/// Few-shot examples taken from each catalog entry.
const FEW_SHOT_PER_INTENT: usize = 1;

pub struct IntentClassifier {
    model: Option<Arc<dyn IntentModel>>,
    catalog: IntentCatalog,
    fast_path: bool,
    /// Rendered catalog context and few-shot block, built on first use.
    /// The catalog is fixed for the lifetime of the classifier.
    rendered: OnceLock<(String, String)>,
}

impl IntentClassifier {
    pub fn new(model: Arc<dyn IntentModel>, catalog: IntentCatalog) -> Self {
        Self {
            model: Some(model),
            catalog,
            fast_path: true,
            rendered: OnceLock::new(),
        }
    }

    /// Keyword rules only; no model is ever contacted.
    pub fn heuristic_only() -> Self {
        Self {
            model: None,
            catalog: IntentCatalog::default(),
            fast_path: true,
            rendered: OnceLock::new(),
        }
    }

    pub fn with_fast_path(mut self, enabled: bool) -> Self {
        self.fast_path = enabled;
        self
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    pub async fn classify(&self, prompt: &str) -> Classification {
        if self.fast_path
            && let Some(classification) = fast_path(prompt)
        {
            debug!("Intent fast path: {}", classification.reasoning);
            return classification;
        }

        let Some(model) = &self.model else {
            return classify_heuristic(prompt);
        };

        if !model.is_ready().await {
            info!("Intent model not reachable, attempting warm-up");
            if let Err(e) = model.warm_up().await {
                warn!("Intent model warm-up failed, using heuristic: {}", e);
                return classify_heuristic(prompt);
            }
        }

        let request = self.classification_request(prompt);
        let handle = match model.generate(&request).await {
            Ok(handle) => handle,
            Err(e @ (GatewayError::ConnectionError(_) | GatewayError::Timeout)) => {
                warn!("Intent model unreachable, using heuristic: {}", e);
                return classify_heuristic(prompt);
            }
            Err(e) => {
                warn!("Intent model request failed: {}", e);
                return Classification::ambiguous(format!("classifier request failed: {}", e));
            }
        };

        match handle.collect_text().await {
            Ok(raw) => {
                let classification = parse_classification(&raw);
                debug!("Intent model output parsed as {}", classification.intent);
                classification
            }
            Err(e) => {
                warn!("Intent model stream failed: {}", e);
                Classification::ambiguous(format!("classifier stream failed: {}", e))
            }
        }
    }

    fn classification_request(&self, prompt: &str) -> String {
        let (context, few_shot) = self.rendered.get_or_init(|| {
            (
                self.catalog.render_context(),
                self.catalog.few_shot_examples(FEW_SHOT_PER_INTENT),
            )
        });
        PromptTemplate::classification_prompt(
            context,
            &self.catalog.intent_names(),
            few_shot,
            prompt,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedIntentModel;
    use std::sync::atomic::Ordering;
    use switchboard_domain::Intent;

    fn classifier(model: ScriptedIntentModel) -> (IntentClassifier, Arc<ScriptedIntentModel>) {
        let model = Arc::new(model);
        (IntentClassifier::new(model.clone(), IntentCatalog::default()), model)
    }

    #[tokio::test]
    async fn test_model_answer_is_parsed() {
        let (classifier, model) = classifier(ScriptedIntentModel::answering(
            r#"Sure! {"intent": "search_data", "reasoning": "asks for notes"}"#,
        ));
        let result = classifier.classify("what did we decide yesterday").await;
        assert_eq!(result.intent, Intent::SearchData);
        assert_eq!(result.reasoning, "asks for notes");
        assert_eq!(model.generations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_greeting_skips_model() {
        let (classifier, model) = classifier(ScriptedIntentModel::answering("{}"));
        let result = classifier.classify("hi").await;
        assert_eq!(result.intent, Intent::Smalltalk);
        assert_eq!(model.generations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fast_path_can_be_disabled() {
        let (classifier, model) = classifier(ScriptedIntentModel::answering(
            r#"{"intent": "smalltalk", "reasoning": "hello"}"#,
        ));
        let classifier = classifier.with_fast_path(false);
        classifier.classify("hi").await;
        assert_eq!(model.generations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparseable_output_is_ambiguous() {
        let (classifier, _) = classifier(ScriptedIntentModel::answering("I think it's a search"));
        let result = classifier.classify("where are the q3 numbers").await;
        assert_eq!(result.intent, Intent::Ambiguous);
        assert!(!result.reasoning.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_intent_is_ambiguous() {
        let (classifier, _) = classifier(ScriptedIntentModel::answering(
            r#"{"intent": "weather", "reasoning": "x"}"#,
        ));
        let result = classifier.classify("is it raining in the office").await;
        assert_eq!(result.intent, Intent::Ambiguous);
        assert!(result.reasoning.contains("weather"));
    }

    #[tokio::test]
    async fn test_unreachable_model_warms_up_once_then_uses_heuristic() {
        let (classifier, model) = classifier(ScriptedIntentModel::unreachable());
        let result = classifier.classify("is slack connected").await;
        assert_eq!(result.intent, Intent::SystemStatus);
        assert_eq!(model.warm_ups.load(Ordering::SeqCst), 1);
        assert_eq!(model.generations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_warm_up_success_uses_model() {
        let model = ScriptedIntentModel {
            starts_on_warm_up: true,
            output: r#"{"intent": "summarize", "reasoning": "summary"}"#.into(),
            ..ScriptedIntentModel::default()
        };
        let (classifier, model) = classifier(model);
        let result = classifier.classify("wrap up the design doc for me").await;
        assert_eq!(result.intent, Intent::Summarize);
        assert_eq!(model.warm_ups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stream_error_is_ambiguous() {
        let model = ScriptedIntentModel {
            generate_error: Some("connection reset".into()),
            ..ScriptedIntentModel::answering("")
        };
        let (classifier, _) = classifier(model);
        let result = classifier.classify("find the roadmap").await;
        assert_eq!(result.intent, Intent::Ambiguous);
        assert!(result.reasoning.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_heuristic_only() {
        let classifier = IntentClassifier::heuristic_only();
        assert_eq!(
            classifier.classify("find tickets about onboarding").await.intent,
            Intent::SearchData
        );
    }

    #[test]
    fn test_request_lists_every_intent() {
        let classifier = IntentClassifier::heuristic_only();
        let request = classifier.classification_request("hello there");
        for name in classifier.catalog().intent_names() {
            assert!(request.contains(name), "missing {}", name);
        }
        assert!(request.ends_with("User: \"hello there\""));
    }
}
