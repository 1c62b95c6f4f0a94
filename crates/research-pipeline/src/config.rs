//! Pipeline tunables per profile.

use std::time::Duration;

use research_retrieval::{BackendSpec, ChainConfig, SearchBackend};
use research_summarizer::SummaryConfig;
use research_types::{PipelineProfile, ResearchError, Settings};

/// Sources kept in a report.
pub const MAX_SOURCES: usize = 5;

/// Everything the orchestrator needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub profile: PipelineProfile,
    pub chain: ChainConfig,
    pub summary: SummaryConfig,
    /// Documents kept from the retrieval, in order
    pub max_sources: usize,
}

impl PipelineConfig {
    /// Built-in tunables for a profile.
    pub fn for_profile(profile: PipelineProfile) -> Self {
        let (max_results, summary) = match profile {
            PipelineProfile::Abstractive => (7, SummaryConfig::abstractive()),
            PipelineProfile::Extractive => (5, SummaryConfig::extractive()),
        };
        Self {
            profile,
            chain: ChainConfig::default().with_max_results(max_results),
            summary,
            max_sources: MAX_SOURCES,
        }
    }

    /// Profile tunables with the search section of `settings` applied.
    pub fn from_settings(settings: &Settings) -> Result<Self, ResearchError> {
        let mut config = Self::for_profile(settings.profile);
        let search = &settings.search;

        let backends = search
            .backends
            .iter()
            .map(|name| {
                name.parse::<SearchBackend>()
                    .map(|backend| BackendSpec::new(backend).with_max_attempts(search.max_attempts))
                    .map_err(|e| ResearchError::Config(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if backends.is_empty() {
            return Err(ResearchError::Config(
                "at least one search backend is required".to_string(),
            ));
        }

        config.chain = config
            .chain
            .with_backends(backends)
            .with_empty_result_pause(Duration::from_millis(search.empty_result_pause_ms));
        if let Some(max_results) = search.max_results {
            config.chain = config.chain.with_max_results(max_results.max(1));
        }

        Ok(config)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_profile(PipelineProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_summarizer::BudgetMode;

    #[test]
    fn test_profile_tunables() {
        let abstractive = PipelineConfig::for_profile(PipelineProfile::Abstractive);
        assert_eq!(abstractive.chain.max_results, 7);
        assert_eq!(abstractive.summary.encyclopedia_char_limit, 1500);
        assert_eq!(abstractive.summary.budget_mode, BudgetMode::Tokens);

        let extractive = PipelineConfig::for_profile(PipelineProfile::Extractive);
        assert_eq!(extractive.chain.max_results, 5);
        assert_eq!(extractive.summary.encyclopedia_char_limit, 2000);
        assert_eq!(
            extractive.summary.budget_mode,
            BudgetMode::Sentences {
                tokens_per_sentence: 20
            }
        );

        for config in [abstractive, extractive] {
            assert_eq!(config.max_sources, 5);
            assert_eq!(config.summary.search_char_limit, 3000);
            assert_eq!(config.summary.min_viable_chars, 50);
        }
    }

    #[test]
    fn test_from_settings_applies_search_section() {
        let mut settings = Settings::default();
        settings.profile = PipelineProfile::Abstractive;
        settings.search.backends = vec!["lite".to_string(), "html".to_string()];
        settings.search.max_attempts = 2;
        settings.search.max_results = Some(3);
        settings.search.empty_result_pause_ms = 0;

        let config = PipelineConfig::from_settings(&settings).unwrap();
        let order: Vec<_> = config.chain.backends.iter().map(|b| b.backend).collect();
        assert_eq!(order, vec![SearchBackend::Lite, SearchBackend::Html]);
        assert!(config.chain.backends.iter().all(|b| b.max_attempts == 2));
        assert_eq!(config.chain.max_results, 3);
        assert_eq!(config.chain.empty_result_pause, Duration::ZERO);
        assert_eq!(config.summary, SummaryConfig::abstractive());
    }

    #[test]
    fn test_from_settings_rejects_unknown_backend() {
        let mut settings = Settings::default();
        settings.search.backends = vec!["bing".to_string()];
        let err = PipelineConfig::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("bing"));
    }

    #[test]
    fn test_from_settings_rejects_empty_backends() {
        let mut settings = Settings::default();
        settings.search.backends.clear();
        assert!(PipelineConfig::from_settings(&settings).is_err());
    }
}
