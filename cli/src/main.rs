//! CLI entrypoint for switchboard
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use switchboard_application::{
    CacheStore, HandlePromptInput, HandlePromptUseCase, IntentClassifier, LlmGateway,
    RecordStore, TokenStore, ToolCatalog, ToolDispatcher,
};
use switchboard_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, InMemoryCache, InMemoryRecordStore, JiraOAuth,
    OllamaIntentModel, OpenAiGateway, SlackOAuth, StoreBackend, SupabaseRecordStore,
    build_handler_table, load_intent_catalog,
};
use switchboard_presentation::{ChatRepl, Cli, ConsoleFormatter, OutputFormat, formatter_for};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    info!("Starting switchboard");

    ConsoleFormatter::set_color_enabled(config.output.color);
    let format = cli.output.unwrap_or(match config.output.format {
        Some(FileOutputFormat::Json) => OutputFormat::Json,
        Some(FileOutputFormat::Text) | None => OutputFormat::Text,
    });

    // === Dependency Injection ===
    let use_case = Arc::new(build_use_case(&config).await?);

    if cli.status {
        let response = use_case.status(&cli.user).await?;
        println!("{}", formatter_for(format).format(&response));
        return Ok(());
    }

    if cli.chat {
        let mut repl = ChatRepl::new(use_case, cli.user.clone()).with_format(format);
        repl.run().await?;
        return Ok(());
    }

    // Single prompt mode - prompt is required
    let prompt = match cli.prompt {
        Some(p) => p,
        None => bail!("Prompt is required. Use --chat for interactive mode or --status."),
    };

    let response = use_case
        .execute(HandlePromptInput::new(prompt, cli.user))
        .await?;
    println!("{}", formatter_for(format).format(&response));

    Ok(())
}

async fn build_use_case(config: &FileConfig) -> Result<HandlePromptUseCase> {
    let params = config.pipeline_params();
    let request_timeout = Duration::from_secs(config.dispatch.request_timeout_seconds);

    // Storage
    let records = build_record_store(config, request_timeout)?;
    let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCache::new());

    // The registry must load once before any prompt is served
    let catalog = Arc::new(ToolCatalog::new(records.clone(), cache.clone(), &params));
    let registry = catalog
        .load()
        .await
        .context("Tool registry could not be loaded")?;
    if registry.is_empty() {
        warn!(
            "Tool registry '{}' is empty; requests will not reach any provider",
            params.registry_table
        );
    }

    // Tokens and OAuth clients
    let mut tokens = TokenStore::new(records, cache.clone(), &params);
    if config.providers.slack.oauth_configured() {
        tokens = tokens.with_provider(Arc::new(SlackOAuth::new(
            config.providers.slack.clone(),
            request_timeout,
        )?));
    }
    if config.providers.jira.oauth_configured() {
        tokens = tokens.with_provider(Arc::new(JiraOAuth::new(
            config.providers.jira.clone(),
            request_timeout,
        )?));
    }
    let tokens = Arc::new(tokens);

    // Dispatch
    let handlers = build_handler_table(&config.providers, tokens.clone(), request_timeout)?;
    let dispatcher = Arc::new(ToolDispatcher::new(
        catalog.clone(),
        handlers,
        cache,
        tokens.clone(),
        &params,
    ));

    // Models
    let classifier = if params.use_llm_classifier {
        let intents = load_intent_catalog(config.intent.intents_file.as_deref())?;
        IntentClassifier::new(Arc::new(OllamaIntentModel::new(&config.intent)?), intents)
    } else {
        info!("Intent model disabled, using keyword classification");
        IntentClassifier::heuristic_only()
    }
    .with_fast_path(params.fast_path);
    let llm: Arc<dyn LlmGateway> = Arc::new(OpenAiGateway::new(&config.llm)?);

    Ok(HandlePromptUseCase::new(
        Arc::new(classifier),
        catalog,
        dispatcher,
        tokens,
        llm,
        &params,
    ))
}

fn build_record_store(config: &FileConfig, timeout: Duration) -> Result<Arc<dyn RecordStore>> {
    let store = &config.store;
    match store.backend {
        StoreBackend::Memory => match &store.seed_file {
            Some(path) => Ok(Arc::new(InMemoryRecordStore::from_seed_file(path)?)),
            None => {
                warn!("In-memory store without a seed file; the tool registry starts empty");
                Ok(Arc::new(InMemoryRecordStore::new()))
            }
        },
        StoreBackend::Supabase => {
            let url = store.url.as_deref().context("store.url is required for supabase")?;
            let key = store
                .service_key
                .as_deref()
                .context("store.service_key is required for supabase")?;
            Ok(Arc::new(SupabaseRecordStore::new(url, key, timeout)?))
        }
    }
}
