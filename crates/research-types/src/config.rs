//! Configuration loading for the research agent.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/research-agent/config.toml.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ResearchError;

const APP_NAME: &str = "research-agent";

/// Named bundle of pipeline tunables and condensation engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineProfile {
    /// API-backed abstractive summaries with a token budget
    Abstractive,
    /// Local extractive summaries with a sentence budget (default)
    #[default]
    Extractive,
}

impl PipelineProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineProfile::Abstractive => "abstractive",
            PipelineProfile::Extractive => "extractive",
        }
    }
}

impl fmt::Display for PipelineProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineProfile {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abstractive" => Ok(PipelineProfile::Abstractive),
            "extractive" => Ok(PipelineProfile::Extractive),
            other => Err(ResearchError::Config(format!("unknown profile '{}'", other))),
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Backend identifiers tried in order ("api", "html", "lite")
    #[serde(default = "default_backends")]
    pub backends: Vec<String>,

    /// Attempts per backend before moving on
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Result cap passed to each backend (profile default when unset)
    #[serde(default)]
    pub max_results: Option<usize>,

    /// Pause after a backend returns zero results (milliseconds)
    #[serde(default = "default_empty_result_pause_ms")]
    pub empty_result_pause_ms: u64,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent to the search provider
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_backends() -> Vec<String> {
    vec!["api".to_string(), "html".to_string(), "lite".to_string()]
}

fn default_max_attempts() -> u32 {
    1
}

fn default_empty_result_pause_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION"))
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            backends: default_backends(),
            max_attempts: default_max_attempts(),
            max_results: None,
            empty_result_pause_ms: default_empty_result_pause_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Encyclopedic fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncyclopediaSettings {
    /// MediaWiki Action API endpoint
    #[serde(default = "default_encyclopedia_url")]
    pub api_url: String,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_encyclopedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

impl Default for EncyclopediaSettings {
    fn default() -> Self {
        Self {
            api_url: default_encyclopedia_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Summarizer configuration (abstractive profile)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerSettings {
    /// Provider name ("openai" or "anthropic")
    #[serde(default = "default_summarizer_provider")]
    pub provider: String,

    /// Model name (e.g., "gpt-4o-mini", "claude-3-haiku")
    #[serde(default = "default_summarizer_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base_url: Option<String>,
}

fn default_summarizer_provider() -> String {
    "openai".to_string()
}

fn default_summarizer_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            provider: default_summarizer_provider(),
            model: default_summarizer_model(),
            api_key: None,
            api_base_url: None,
        }
    }
}

/// Input screening configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetySettings {
    /// Terms blocked in addition to the built-in list
    #[serde(default)]
    pub extra_blocked_terms: Vec<String>,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Pipeline profile
    #[serde(default)]
    pub profile: PipelineProfile,

    /// Path of the persisted preference record
    #[serde(default = "default_preferences_path")]
    pub preferences_path: String,

    /// Path of the read-only default preference record
    #[serde(default = "default_preference_defaults_path")]
    pub preference_defaults_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub encyclopedia: EncyclopediaSettings,

    #[serde(default)]
    pub summarizer: SummarizerSettings,

    #[serde(default)]
    pub safety: SafetySettings,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

fn default_preferences_path() -> String {
    project_dirs()
        .map(|p| p.data_local_dir().join("preferences.json"))
        .unwrap_or_else(|| PathBuf::from("./preferences.json"))
        .to_string_lossy()
        .to_string()
}

fn default_preference_defaults_path() -> String {
    project_dirs()
        .map(|p| p.config_dir().join("preference-defaults.json"))
        .unwrap_or_else(|| PathBuf::from("./preference-defaults.json"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: PipelineProfile::default(),
            preferences_path: default_preferences_path(),
            preference_defaults_path: default_preference_defaults_path(),
            log_level: default_log_level(),
            search: SearchSettings::default(),
            encyclopedia: EncyclopediaSettings::default(),
            summarizer: SummarizerSettings::default(),
            safety: SafetySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/research-agent/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (RESEARCH_*, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ResearchError> {
        let config_dir = project_dirs()
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("profile", PipelineProfile::default().as_str())
            .map_err(|e| ResearchError::Config(e.to_string()))?
            .set_default("preferences_path", default_preferences_path())
            .map_err(|e| ResearchError::Config(e.to_string()))?
            .set_default("preference_defaults_path", default_preference_defaults_path())
            .map_err(|e| ResearchError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| ResearchError::Config(e.to_string()))?
            .set_default("summarizer.provider", default_summarizer_provider())
            .map_err(|e| ResearchError::Config(e.to_string()))?
            .set_default("summarizer.model", default_summarizer_model())
            .map_err(|e| ResearchError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // RESEARCH_LOG_LEVEL, RESEARCH_SEARCH__MAX_RESULTS, RESEARCH_SUMMARIZER__API_KEY, ...
        builder = builder.add_source(
            Environment::with_prefix("RESEARCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ResearchError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ResearchError::Config(e.to_string()))
    }

    /// Expand a leading `~/` in a configured path.
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn expanded_preferences_path(&self) -> PathBuf {
        Self::expand_path(&self.preferences_path)
    }

    pub fn expanded_preference_defaults_path(&self) -> PathBuf {
        Self::expand_path(&self.preference_defaults_path)
    }
}
