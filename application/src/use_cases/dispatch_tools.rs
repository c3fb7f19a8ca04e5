//! Tool dispatch use case.
//!
//! Resolves, prepares and runs a batch of tool calls concurrently, with a
//! per-call result cache. One result per call, in call order; per-call
//! failures are returned as error-shaped results and never abort siblings.

use super::token_store::TokenStore;
use super::tool_catalog::ToolCatalog;
use crate::config::PipelineParams;
use crate::ports::cache_store::CacheStore;
use crate::ports::tool_handler::HandlerTable;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use switchboard_domain::tool::cache_key;
use switchboard_domain::{
    InjectionContext, Preparation, PreparedCall, ToolCall, ToolFamily, ToolKind, ToolRegistry,
    ToolResult,
};
use tracing::{debug, warn};

const MESSAGING_AUTH_MESSAGE: &str = "User must authorize Slack before this action can be performed.";

pub struct ToolDispatcher {
    catalog: Arc<ToolCatalog>,
    handlers: HandlerTable,
    cache: Arc<dyn CacheStore>,
    tokens: Arc<TokenStore>,
    result_ttl: Duration,
    handler_timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        handlers: HandlerTable,
        cache: Arc<dyn CacheStore>,
        tokens: Arc<TokenStore>,
        params: &PipelineParams,
    ) -> Self {
        Self {
            catalog,
            handlers,
            cache,
            tokens,
            result_ttl: params.tool_result_ttl,
            handler_timeout: params.handler_timeout,
        }
    }

    pub async fn dispatch(&self, calls: Vec<ToolCall>, prompt: &str, user_id: &str) -> Vec<ToolResult> {
        let registry = match self.catalog.registry().await {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Dispatch without registry: {}", e);
                return calls
                    .iter()
                    .map(|_| ToolResult::upstream("registry", None, e.to_string()))
                    .collect();
            }
        };

        // Resolved once per batch; only messaging calls need it
        let messaging_user_id = if calls
            .iter()
            .any(|c| ToolFamily::of_name(&c.name) == ToolFamily::Messaging)
        {
            self.tokens.provider_user_id("slack", user_id).await
        } else {
            None
        };

        let ctx = InjectionContext {
            prompt,
            app_user_id: user_id,
            messaging_user_id: messaging_user_id.as_deref(),
        };

        join_all(calls.into_iter().map(|call| self.run_one(&registry, call, ctx))).await
    }

    async fn run_one(&self, registry: &ToolRegistry, call: ToolCall, ctx: InjectionContext<'_>) -> ToolResult {
        if !registry.get(&call.name).is_some_and(|tool| tool.enabled) {
            debug!(tool = %call.name, "Unsupported tool");
            return ToolResult::unsupported_tool(&call.name);
        }

        let Ok(kind) = call.name.parse::<ToolKind>() else {
            return ToolResult::no_handler(&call.name);
        };
        let Some(handler) = self.handlers.get(kind) else {
            return ToolResult::no_handler(&call.name);
        };

        let prepared = match PreparedCall::prepare(kind, call.parameters, &ctx) {
            Preparation::Ready(prepared) => prepared,
            Preparation::NeedsAuthorization { provider } => {
                let auth_url = self.tokens.authorize_url(provider, ctx.app_user_id);
                return ToolResult::auth_required(provider, &auth_url, MESSAGING_AUTH_MESSAGE);
            }
        };
        let call = prepared.into_call();
        let key = cache_key(&call);

        if let Some(cached) = self.cached(&key).await {
            debug!(tool = %call.name, "Cache hit");
            return cached;
        }

        let result = match tokio::time::timeout(self.handler_timeout, handler.call(&call.parameters)).await {
            Ok(value) => ToolResult::from_value(value),
            Err(_) => {
                warn!(tool = %call.name, "Handler timed out after {:?}", self.handler_timeout);
                ToolResult::timeout(&call.name, self.handler_timeout.as_secs())
            }
        };

        if result.is_cacheable() {
            self.store(&key, &result).await;
            debug!(tool = %call.name, "Cached result");
        } else {
            debug!(tool = %call.name, "Skipped cache write for empty or error result");
        }
        result
    }

    async fn cached(&self, key: &str) -> Option<ToolResult> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(ToolResult::from_value(value)),
                Err(e) => {
                    warn!("Ignoring unreadable cached result: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Result cache read failed: {}", e);
                None
            }
        }
    }

    async fn store(&self, key: &str, result: &ToolResult) {
        match serde_json::to_string(result) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(key, raw, Some(self.result_ttl)).await {
                    warn!("Result cache write failed: {}", e);
                }
            }
            Err(e) => warn!("Could not serialize tool result: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tool_handler::ToolHandler;
    use crate::test_support::{CountingHandler, MemoryCache, MemoryRecords, registry_rows};
    use serde_json::{Value, json};
    use std::time::Instant;

    struct Fixture {
        dispatcher: ToolDispatcher,
        cache: Arc<MemoryCache>,
    }

    fn fixture(handlers: Vec<(ToolKind, Arc<CountingHandler>)>, params: PipelineParams) -> Fixture {
        let records = Arc::new(MemoryRecords::new().with_rows("context_registry", registry_rows()));
        let cache = Arc::new(MemoryCache::new());
        let catalog = Arc::new(ToolCatalog::new(records.clone(), cache.clone(), &params));
        let tokens = Arc::new(TokenStore::new(records, cache.clone(), &params));
        let table = handlers
            .into_iter()
            .fold(HandlerTable::new(), |table, (kind, handler)| {
                table.register(kind, handler as Arc<dyn ToolHandler>)
            });
        Fixture {
            dispatcher: ToolDispatcher::new(catalog, table, cache.clone(), tokens, &params),
            cache,
        }
    }

    fn notion(reply: Value) -> Arc<CountingHandler> {
        Arc::new(CountingHandler::new(reply))
    }

    #[tokio::test]
    async fn test_identical_calls_hit_cache() {
        let handler = notion(json!({"results": [{"id": "p1"}]}));
        let f = fixture(vec![(ToolKind::NotionSearch, handler.clone())], PipelineParams::default());
        let call = ToolCall::new("notion_search").with_param("query", "roadmap");

        let first = f.dispatcher.dispatch(vec![call.clone()], "roadmap", "app-1").await;
        let second = f.dispatcher.dispatch(vec![call], "roadmap", "app-1").await;

        assert_eq!(handler.count(), 1);
        assert_eq!(first, second);
        assert_eq!(f.cache.keys_with_prefix("tool_call:notion_search:").len(), 1);
    }

    #[tokio::test]
    async fn test_empty_and_error_results_are_not_cached() {
        for reply in [json!({}), json!({"error": "x"}), json!({"results": []})] {
            let handler = notion(reply);
            let f = fixture(vec![(ToolKind::NotionSearch, handler.clone())], PipelineParams::default());
            let call = ToolCall::new("notion_search").with_param("query", "q");

            f.dispatcher.dispatch(vec![call.clone()], "q", "app-1").await;
            f.dispatcher.dispatch(vec![call], "q", "app-1").await;
            assert_eq!(handler.count(), 2);
        }
    }

    #[tokio::test]
    async fn test_unknown_and_disabled_tools_are_unsupported() {
        let f = fixture(vec![], PipelineParams::default());
        let results = f
            .dispatcher
            .dispatch(
                vec![ToolCall::new("fax_send"), ToolCall::new("notion_retrieve_page")],
                "q",
                "app-1",
            )
            .await;
        assert_eq!(results[0].error(), Some("Unsupported tool name: fax_send"));
        assert_eq!(
            results[1].error(),
            Some("Unsupported tool name: notion_retrieve_page")
        );
        assert_eq!(f.cache.sets.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_registered_tool_without_handler() {
        let f = fixture(vec![], PipelineParams::default());
        let results = f
            .dispatcher
            .dispatch(vec![ToolCall::new("github_search_code"), ToolCall::new("jira_get_issue")], "q", "app-1")
            .await;
        assert!(results[0].error().unwrap().starts_with("No handler function found"));
        assert!(results[1].error().unwrap().starts_with("No handler function found"));
    }

    #[tokio::test]
    async fn test_messaging_without_mapping_requires_auth() {
        let handler = notion(json!({"messages": {"matches": []}}));
        let f = fixture(vec![(ToolKind::SlackSearchMessages, handler.clone())], PipelineParams::default());
        let results = f
            .dispatcher
            .dispatch(vec![ToolCall::new("slack_search_messages")], "launch", "app-1")
            .await;

        assert!(results[0].is_auth_required());
        assert_eq!(results[0].provider(), Some("slack"));
        assert_eq!(handler.count(), 0);
    }

    #[tokio::test]
    async fn test_messaging_parameters_are_injected() {
        let handler = notion(json!({"messages": {"matches": [{"text": "hi"}]}}));
        let f = fixture(vec![(ToolKind::SlackSearchMessages, handler.clone())], PipelineParams::default());
        f.cache.insert("provider_user:slack:app-1", "U1");

        f.dispatcher
            .dispatch(vec![ToolCall::new("slack_search_messages")], "launch plan", "app-1")
            .await;

        let seen = handler.seen.lock().unwrap();
        assert_eq!(seen[0]["slack_user_id"], "U1");
        assert_eq!(seen[0]["app_user_id"], "app-1");
        assert_eq!(seen[0]["query"], "launch plan");
    }

    #[tokio::test]
    async fn test_issue_search_gets_jql_and_user_id() {
        let handler = notion(json!({"issues": [{"key": "ABC-1"}]}));
        let f = fixture(vec![(ToolKind::JiraSearchIssues, handler.clone())], PipelineParams::default());
        let prompt = "find tickets about onboarding in project ABC";

        f.dispatcher.dispatch(vec![ToolCall::new("jira_search_issues")], prompt, "app-1").await;

        let seen = handler.seen.lock().unwrap();
        let jql = seen[0]["jql"].as_str().unwrap();
        assert!(jql.contains(r#"project = "ABC""#));
        assert!(jql.contains(r#"text ~ "onboarding""#));
        assert_eq!(seen[0]["user_id"], "app-1");
        assert!(!seen[0].contains_key("query"));
    }

    #[tokio::test]
    async fn test_non_mapping_output_is_wrapped() {
        let handler = notion(json!(["a", "b"]));
        let f = fixture(vec![(ToolKind::NotionSearch, handler)], PipelineParams::default());
        let results = f.dispatcher.dispatch(vec![ToolCall::new("notion_search")], "q", "app-1").await;
        assert_eq!(results[0].get("result"), Some(&json!(["a", "b"])));
    }

    #[tokio::test]
    async fn test_calls_run_concurrently_and_keep_order() {
        let slow = Arc::new(CountingHandler::slow(json!({"issues": [{"key": "A-1"}]}), Duration::from_millis(200)));
        let fast = Arc::new(CountingHandler::slow(json!({"results": [{"id": "p"}]}), Duration::from_millis(200)));
        let f = fixture(
            vec![(ToolKind::JiraSearchIssues, slow), (ToolKind::NotionSearch, fast)],
            PipelineParams::default(),
        );

        let started = Instant::now();
        let results = f
            .dispatcher
            .dispatch(
                vec![ToolCall::new("jira_search_issues"), ToolCall::new("notion_search")],
                "q",
                "app-1",
            )
            .await;

        assert!(started.elapsed() < Duration::from_millis(390));
        assert!(results[0].get("issues").is_some());
        assert!(results[1].get("results").is_some());
    }

    #[tokio::test]
    async fn test_slow_handler_times_out_without_blocking_siblings() {
        let slow = Arc::new(CountingHandler::slow(json!({"issues": [{"key": "A-1"}]}), Duration::from_secs(5)));
        let quick = notion(json!({"results": [{"id": "p"}]}));
        let params = PipelineParams::default().with_handler_timeout(Duration::from_millis(50));
        let f = fixture(
            vec![(ToolKind::JiraSearchIssues, slow), (ToolKind::NotionSearch, quick)],
            params,
        );

        let results = f
            .dispatcher
            .dispatch(
                vec![ToolCall::new("jira_search_issues"), ToolCall::new("notion_search")],
                "q",
                "app-1",
            )
            .await;

        assert_eq!(results[0].error(), Some("timeout"));
        assert!(!results[1].is_error());
    }
}
