//! End-to-end test infrastructure for the research agent.
//!
//! Provides a shared TestHarness and helpers for tests covering the full
//! topic-to-report pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use research_pipeline::{KeywordSafetyFilter, PipelineConfig, ResearchPipeline};
use research_retrieval::{EncyclopediaProvider, SearchProvider};
use research_storage::PreferenceStore;
use research_summarizer::Condenser;
use research_types::{PipelineProfile, RawDocument};

/// Shared test harness for E2E tests.
///
/// Owns a temp directory holding the preference files and builds pipelines
/// that share the same preference store.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Persisted preference record
    pub preferences_path: PathBuf,
    /// Read-only defaults record
    pub defaults_path: PathBuf,
    pub preferences: Arc<PreferenceStore>,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let preferences_path = temp_dir.path().join("state").join("preferences.json");
        let defaults_path = temp_dir.path().join("preference-defaults.json");
        let preferences = Arc::new(PreferenceStore::new(&preferences_path, &defaults_path));

        Self {
            _temp_dir: temp_dir,
            preferences_path,
            defaults_path,
            preferences,
        }
    }

    /// Write a defaults record before the first load.
    pub fn write_defaults(&self, json: &str) {
        std::fs::write(&self.defaults_path, json).expect("Failed to write defaults");
    }

    /// Overwrite the persisted record directly.
    pub fn write_state(&self, contents: &str) {
        if let Some(parent) = self.preferences_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create state dir");
        }
        std::fs::write(&self.preferences_path, contents).expect("Failed to write state");
    }

    /// Parsed contents of the persisted record.
    pub fn read_state(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(&self.preferences_path).expect("No state file");
        serde_json::from_str(&raw).expect("State file is not JSON")
    }

    /// Build a pipeline over the given collaborators with no empty-result pause.
    pub fn pipeline(
        &self,
        search: Arc<dyn SearchProvider>,
        encyclopedia: Arc<dyn EncyclopediaProvider>,
        condenser: Arc<dyn Condenser>,
        profile: PipelineProfile,
    ) -> ResearchPipeline {
        let mut config = PipelineConfig::for_profile(profile);
        config.chain = config.chain.with_empty_result_pause(Duration::ZERO);

        ResearchPipeline::new(
            search,
            encyclopedia,
            condenser,
            self.preferences.clone(),
            Arc::new(KeywordSafetyFilter::new()),
            config,
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Create N search hits on the given domain with multi-sentence bodies.
pub fn create_search_hits(count: usize, domain: &str, topic: &str) -> Vec<RawDocument> {
    (0..count)
        .map(|i| {
            RawDocument::search_hit(
                format!("{} result {}", topic, i),
                format!("https://{}/{}/{}", domain, topic.replace(' ', "-"), i),
                format!(
                    "{topic} is discussed in source {i}. Experts describe {topic} in detail. \
                     Source {i} adds a remark about history."
                ),
            )
        })
        .collect()
}
