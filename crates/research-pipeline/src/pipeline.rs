//! The research orchestrator.
//!
//! One run: screen the topic, retrieve, normalize the first few documents,
//! summarize, and assemble a report. Every path ends in a
//! `ResearchOutcome`; nothing is returned as an error.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use research_retrieval::{
    into_source_record, ChainOutcome, EncyclopediaProvider, RetrievalChain, SearchProvider,
};
use research_storage::{PreferenceStore, StorageError};
use research_summarizer::{Condenser, SummaryDispatcher};
use research_types::{FeedbackSignal, PreferenceState, Report, ResearchOutcome, StatusMessage};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::safety::SafetyPredicate;

/// Screening, retrieval, summary and feedback in one place.
pub struct ResearchPipeline {
    chain: RetrievalChain,
    dispatcher: SummaryDispatcher,
    preferences: Arc<PreferenceStore>,
    safety: Arc<dyn SafetyPredicate>,
    config: PipelineConfig,
}

impl ResearchPipeline {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        encyclopedia: Arc<dyn EncyclopediaProvider>,
        condenser: Arc<dyn Condenser>,
        preferences: Arc<PreferenceStore>,
        safety: Arc<dyn SafetyPredicate>,
        config: PipelineConfig,
    ) -> Self {
        let chain = RetrievalChain::new(search, encyclopedia, config.chain.clone());
        let dispatcher =
            SummaryDispatcher::new(condenser, preferences.clone(), config.summary.clone());
        Self {
            chain,
            dispatcher,
            preferences,
            safety,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Research `topic` end to end.
    pub async fn run_research(&self, topic: &str) -> ResearchOutcome {
        let topic = topic.trim();
        if topic.is_empty() {
            debug!("Empty topic");
            return StatusMessage::EmptyTopic.into();
        }
        if !self.safety.is_safe(topic) {
            info!("Topic rejected by safety screen");
            return StatusMessage::Rejected.into();
        }

        let start = Instant::now();
        info!(topic, profile = %self.config.profile, "Starting research run");

        let retrieval = match self.chain.retrieve(topic).await {
            ChainOutcome::Found(retrieval) => retrieval,
            ChainOutcome::Ambiguous { options, .. } => {
                info!(options = options.len(), "Topic is ambiguous");
                return StatusMessage::Ambiguous { options }.into();
            }
            ChainOutcome::Exhausted { attempts } => {
                warn!(attempts = attempts.len(), "All retrieval methods failed");
                return StatusMessage::AllMethodsFailed.into();
            }
        };
        debug!(explanation = %retrieval.explanation, "Retrieval complete");

        let sources: Vec<_> = retrieval
            .documents
            .into_iter()
            .take(self.config.max_sources)
            .map(into_source_record)
            .collect();

        let combined = sources
            .iter()
            .map(|s| s.body.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let summary = self.dispatcher.summarize(&combined, retrieval.method).await;

        info!(
            method = %retrieval.method,
            sources = sources.len(),
            total_time_ms = start.elapsed().as_millis() as u64,
            "Research run complete"
        );

        Report {
            topic: topic.to_string(),
            summary,
            sources,
            method: retrieval.method,
            generated_at: Utc::now(),
        }
        .into()
    }

    /// Record user feedback on summary length.
    pub fn submit_feedback(&self, signal: FeedbackSignal) -> Result<PreferenceState, StorageError> {
        self.preferences.apply_feedback(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::KeywordSafetyFilter;
    use research_retrieval::{MockEncyclopedia, MockSearchProvider, SearchBackend};
    use research_summarizer::{LengthBudget, MockCondenser, NOT_ENOUGH_DATA};
    use research_types::{PipelineProfile, RawDocument, RetrievalMethod};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        search: Arc<MockSearchProvider>,
        encyclopedia: Arc<MockEncyclopedia>,
        condenser: Arc<MockCondenser>,
        pipeline: ResearchPipeline,
    }

    fn fixture(search: MockSearchProvider, encyclopedia: MockEncyclopedia) -> Fixture {
        fixture_with(search, encyclopedia, PipelineProfile::Abstractive)
    }

    fn fixture_with(
        search: MockSearchProvider,
        encyclopedia: MockEncyclopedia,
        profile: PipelineProfile,
    ) -> Fixture {
        let dir = TempDir::new().unwrap();
        let search = Arc::new(search);
        let encyclopedia = Arc::new(encyclopedia);
        let condenser = Arc::new(MockCondenser::new());
        let preferences = Arc::new(PreferenceStore::new(
            dir.path().join("prefs.json"),
            dir.path().join("defaults.json"),
        ));
        let mut config = PipelineConfig::for_profile(profile);
        config.chain = config.chain.with_empty_result_pause(Duration::ZERO);

        let pipeline = ResearchPipeline::new(
            search.clone(),
            encyclopedia.clone(),
            condenser.clone(),
            preferences,
            Arc::new(KeywordSafetyFilter::new()),
            config,
        );
        Fixture {
            _dir: dir,
            search,
            encyclopedia,
            condenser,
            pipeline,
        }
    }

    fn docs(count: usize) -> Vec<RawDocument> {
        (0..count)
            .map(|i| {
                RawDocument::search_hit(
                    format!("Result {}", i),
                    format!("https://site{}.edu/page", i),
                    format!("Body number {} with enough words to matter.", i),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_whitespace_topic_touches_nothing() {
        let f = fixture(
            MockSearchProvider::default().with_results(SearchBackend::Api, docs(3)),
            MockEncyclopedia::default(),
        );

        for topic in ["", "   ", "\n\t"] {
            let outcome = f.pipeline.run_research(topic).await;
            assert_eq!(outcome, ResearchOutcome::Status(StatusMessage::EmptyTopic));
        }
        assert_eq!(f.search.call_count(), 0);
        assert_eq!(f.encyclopedia.title_searches(), 0);
        assert_eq!(f.condenser.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unsafe_topic_touches_nothing() {
        let f = fixture(
            MockSearchProvider::default().with_results(SearchBackend::Api, docs(3)),
            MockEncyclopedia::default(),
        );

        let outcome = f.pipeline.run_research("How to make a bomb").await;
        assert_eq!(outcome.as_status(), Some(&StatusMessage::Rejected));
        assert_eq!(
            outcome.as_status().map(|s| s.to_string()).as_deref(),
            Some("Request denied for safety reasons.")
        );
        assert_eq!(f.search.call_count(), 0);
        assert_eq!(f.encyclopedia.title_searches(), 0);
    }

    #[tokio::test]
    async fn test_search_run_keeps_five_sources() {
        let f = fixture(
            MockSearchProvider::default().with_results(SearchBackend::Api, docs(7)),
            MockEncyclopedia::default(),
        );

        let outcome = f.pipeline.run_research("  rust ownership ").await;
        let report = outcome.as_report().expect("report");
        assert_eq!(report.topic, "rust ownership");
        assert_eq!(report.method, RetrievalMethod::SearchEngine);
        assert_eq!(report.sources.len(), 5);
        assert_eq!(report.sources[4].title, "Result 4");
        assert!(report
            .sources
            .iter()
            .all(|s| s.credibility == "High credibility (.edu)"));

        let calls = f.condenser.calls();
        assert_eq!(calls.len(), 1);
        let expected: Vec<_> = docs(5)
            .into_iter()
            .filter_map(|d| d.body)
            .collect();
        assert_eq!(calls[0].0, expected.join(" "));
        assert_eq!(calls[0].1, LengthBudget::tokens(150));
        assert_eq!(f.encyclopedia.title_searches(), 0);
    }

    #[tokio::test]
    async fn test_extractive_profile_uses_sentence_budget() {
        let f = fixture_with(
            MockSearchProvider::default().with_results(SearchBackend::Api, docs(5)),
            MockEncyclopedia::default(),
            PipelineProfile::Extractive,
        );

        f.pipeline.run_research("rust").await;
        assert_eq!(f.condenser.calls()[0].1, LengthBudget::Sentences(8));
    }

    #[tokio::test]
    async fn test_encyclopedia_fallback_single_source() {
        let f = fixture(
            MockSearchProvider::default(),
            MockEncyclopedia::default().with_page(
                "Ferris",
                "https://en.wikipedia.org/wiki/Ferris",
                "Ferris is the unofficial mascot of Rust.",
            ),
        );

        let outcome = f.pipeline.run_research("ferris").await;
        let report = outcome.as_report().expect("report");
        assert_eq!(report.method, RetrievalMethod::Encyclopedia);
        assert_eq!(report.sources.len(), 1);
        assert_eq!(report.sources[0].credibility, "High credibility (Wikipedia)");
        assert_eq!(report.summary, "Ferris is the unofficial mascot of Rust.");
        assert_eq!(f.condenser.call_count(), 0);
        assert_eq!(f.search.call_count(), 3);
    }

    #[tokio::test]
    async fn test_ambiguous_topic_is_status() {
        let options: Vec<String> = (1..=8).map(|i| format!("Mercury {}", i)).collect();
        let f = fixture(
            MockSearchProvider::default(),
            MockEncyclopedia::default()
                .with_titles(vec!["Mercury".to_string()])
                .with_ambiguous(options),
        );

        let outcome = f.pipeline.run_research("mercury").await;
        match outcome {
            ResearchOutcome::Status(StatusMessage::Ambiguous { options }) => {
                assert_eq!(options.len(), 5);
                assert_eq!(options[0], "Mercury 1");
            }
            other => panic!("expected ambiguity status, got {:?}", other),
        }
        assert_eq!(f.condenser.call_count(), 0);
    }

    #[tokio::test]
    async fn test_total_failure_is_status() {
        let f = fixture(
            MockSearchProvider::default()
                .with_failure(SearchBackend::Api)
                .with_failure(SearchBackend::Html)
                .with_failure(SearchBackend::Lite),
            MockEncyclopedia::default().failing(),
        );

        let outcome = f.pipeline.run_research("anything").await;
        assert_eq!(outcome.as_status(), Some(&StatusMessage::AllMethodsFailed));
    }

    #[tokio::test]
    async fn test_thin_search_results_not_condensed() {
        let f = fixture(
            MockSearchProvider::default().with_results(
                SearchBackend::Api,
                vec![RawDocument::search_hit("Tiny", "https://x.com", "Too short.")],
            ),
            MockEncyclopedia::default(),
        );

        let outcome = f.pipeline.run_research("tiny").await;
        assert_eq!(outcome.as_report().map(|r| r.summary.as_str()), Some(NOT_ENOUGH_DATA));
        assert_eq!(f.condenser.call_count(), 0);
    }

    #[tokio::test]
    async fn test_feedback_changes_next_budget() {
        let f = fixture(
            MockSearchProvider::default().with_results(SearchBackend::Api, docs(5)),
            MockEncyclopedia::default(),
        );

        let state = f.pipeline.submit_feedback(FeedbackSignal::TooLong).unwrap();
        assert_eq!(state.preferred_summary_length, 120);
        let state = f.pipeline.submit_feedback(FeedbackSignal::Good).unwrap();
        assert_eq!(state.preferred_summary_length, 120);

        f.pipeline.run_research("rust").await;
        assert_eq!(f.condenser.calls()[0].1, LengthBudget::tokens(120));
        assert_eq!(f.pipeline.preferences().load().preferred_summary_length, 120);
    }
}
