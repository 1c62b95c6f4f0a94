//! Command implementations.
//!
//! Each handler:
//! 1. Loads layered settings and applies CLI overrides
//! 2. Initializes logging
//! 3. Builds only the collaborators it needs

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use research_pipeline::{KeywordSafetyFilter, PipelineConfig, ResearchPipeline};
use research_storage::PreferenceStore;
use research_summarizer::{
    shared_condenser, ApiCondenser, ApiCondenserConfig, Condenser, CondenserError,
    ExtractiveCondenser, LazyCondenser,
};
use research_types::{FeedbackSignal, PipelineProfile, Settings, SummarizerSettings};
use research_web::{DuckDuckGoConfig, DuckDuckGoProvider, WikipediaConfig, WikipediaProvider};

use crate::cli::{OutputFormat, PrefsCommands};
use crate::render::{render_json, render_markdown};

/// Load settings and start logging.
fn init(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(level) = log_level_override {
        settings.log_level = level.to_string();
    }

    // Logs go to stderr so stdout carries only the report
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    debug!(profile = %settings.profile, "Configuration loaded");
    Ok(settings)
}

fn preference_store(settings: &Settings) -> PreferenceStore {
    PreferenceStore::new(
        settings.expanded_preferences_path(),
        settings.expanded_preference_defaults_path(),
    )
}

/// API key from settings, else the provider's usual environment variable.
fn resolve_api_key(summarizer: &SummarizerSettings) -> Option<String> {
    summarizer
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            let var = match summarizer.provider.as_str() {
                "anthropic" | "claude" => "ANTHROPIC_API_KEY",
                _ => "OPENAI_API_KEY",
            };
            std::env::var(var).ok().filter(|k| !k.trim().is_empty())
        })
}

fn api_condenser_config(
    summarizer: &SummarizerSettings,
) -> Result<ApiCondenserConfig, CondenserError> {
    let api_key = resolve_api_key(summarizer).ok_or_else(|| {
        CondenserError::ConfigError(format!(
            "no API key for summarizer provider '{}'",
            summarizer.provider
        ))
    })?;

    let config = match (summarizer.api_base_url.as_deref(), summarizer.provider.as_str()) {
        (Some(base), _) => ApiCondenserConfig::custom(base, api_key, summarizer.model.clone()),
        (None, "anthropic" | "claude") => {
            ApiCondenserConfig::claude(api_key, summarizer.model.clone())
        }
        (None, "openai") => ApiCondenserConfig::openai(api_key, summarizer.model.clone()),
        (None, other) => {
            return Err(CondenserError::ConfigError(format!(
                "unknown summarizer provider '{}'",
                other
            )))
        }
    };
    Ok(config)
}

/// Process-wide condenser for the configured profile.
///
/// The API engine is built on first use, so runs that end early never need
/// a key.
fn build_condenser(settings: &Settings) -> Arc<dyn Condenser> {
    let profile = settings.profile;
    let summarizer = settings.summarizer.clone();
    shared_condenser(move || match profile {
        PipelineProfile::Extractive => Arc::new(ExtractiveCondenser::new()) as Arc<dyn Condenser>,
        PipelineProfile::Abstractive => Arc::new(LazyCondenser::new("api", move || {
            let condenser = ApiCondenser::new(api_condenser_config(&summarizer)?)?;
            Ok(Arc::new(condenser) as Arc<dyn Condenser>)
        })) as Arc<dyn Condenser>,
    })
}

fn build_pipeline(settings: &Settings) -> Result<ResearchPipeline> {
    let config = PipelineConfig::from_settings(settings).context("Invalid pipeline settings")?;

    let search = DuckDuckGoProvider::new(DuckDuckGoConfig::from_settings(&settings.search))
        .context("Failed to build search client")?;
    let encyclopedia = WikipediaProvider::new(WikipediaConfig::from_settings(
        &settings.encyclopedia,
        &settings.search.user_agent,
    ))
    .context("Failed to build encyclopedia client")?;

    Ok(ResearchPipeline::new(
        Arc::new(search),
        Arc::new(encyclopedia),
        build_condenser(settings),
        Arc::new(preference_store(settings)),
        Arc::new(KeywordSafetyFilter::from_settings(&settings.safety)),
        config,
    ))
}

/// Research a topic and print the report to stdout.
pub async fn run_research(
    config_path: Option<&str>,
    log_level: Option<&str>,
    topic: &str,
    format: OutputFormat,
    profile_override: Option<PipelineProfile>,
) -> Result<()> {
    let mut settings = init(config_path, log_level)?;
    if let Some(profile) = profile_override {
        settings.profile = profile;
    }

    let pipeline = build_pipeline(&settings)?;
    let outcome = pipeline.run_research(topic).await;

    let rendered = match format {
        OutputFormat::Markdown => render_markdown(&outcome),
        OutputFormat::Json => render_json(&outcome).context("Failed to serialize report")?,
    };
    println!("{}", rendered);
    Ok(())
}

/// Apply a feedback signal to the stored preferences.
pub fn submit_feedback(
    config_path: Option<&str>,
    log_level: Option<&str>,
    signal: FeedbackSignal,
) -> Result<()> {
    let settings = init(config_path, log_level)?;
    let store = preference_store(&settings);

    let state = store
        .apply_feedback(signal)
        .context("Failed to update preferences")?;
    info!(signal = %signal, length = state.preferred_summary_length, "Feedback recorded");

    println!(
        "Memory updated: Preference set to '{}'. Preferred summary length: {}",
        signal, state.preferred_summary_length
    );
    Ok(())
}

/// Show or reset stored preferences.
pub fn handle_prefs(
    config_path: Option<&str>,
    log_level: Option<&str>,
    command: PrefsCommands,
) -> Result<()> {
    let settings = init(config_path, log_level)?;
    let store = preference_store(&settings);

    match command {
        PrefsCommands::Show => {
            let state = store.load();
            let json =
                serde_json::to_string_pretty(&state).context("Failed to serialize preferences")?;
            println!("{}", json);
            println!("# stored at {}", store.state_path().display());
        }
        PrefsCommands::Reset => {
            if !store.state_path().exists() {
                println!("No stored preferences at {}", store.state_path().display());
                return Ok(());
            }
            store.reset().context("Failed to reset preferences")?;
            println!("Preferences reset");
        }
    }
    Ok(())
}
