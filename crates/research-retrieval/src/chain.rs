//! Retrieval strategy chain with graceful degradation.
//!
//! Two strategies run in a fixed order:
//!
//! - Strategy A tries each search backend in turn. A failure moves on to the
//!   next attempt (or backend), and an empty result pauses briefly and moves
//!   on. The first backend with at least one document wins.
//! - Strategy B runs only when A found nothing: look up candidate titles on
//!   the encyclopedic provider and fetch the top one with auto-suggest off.
//!
//! Ambiguity from the encyclopedic provider ends the chain immediately with
//! the candidate titles. Every other provider error is recorded and treated
//! as "no results from this path"; `retrieve` itself never fails.

use std::sync::Arc;
use std::time::{Duration, Instant};

use research_types::{RawDocument, RetrievalMethod};
use tracing::{debug, info, warn};

use crate::provider::{EncyclopediaProvider, ProviderError, SearchProvider};
use crate::types::{
    AttemptRecord, AttemptTarget, BackendOutcome, BackendSpec, OutcomeKind, SearchBackend,
};

/// Tunables for the chain.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Backends tried in order
    pub backends: Vec<BackendSpec>,

    /// Result cap passed to each backend
    pub max_results: usize,

    /// Fixed pause after a backend returns zero results
    pub empty_result_pause: Duration,

    /// Maximum disambiguation options reported
    pub max_options: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            backends: SearchBackend::DEFAULT_ORDER
                .iter()
                .copied()
                .map(BackendSpec::new)
                .collect(),
            max_results: 7,
            empty_result_pause: Duration::from_millis(500),
            max_options: 5,
        }
    }
}

impl ChainConfig {
    pub fn with_backends(mut self, backends: Vec<BackendSpec>) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_empty_result_pause(mut self, pause: Duration) -> Self {
        self.empty_result_pause = pause;
        self
    }
}

/// Documents found by one of the strategies.
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Strategy that produced the documents
    pub method: RetrievalMethod,

    /// Documents in provider order
    pub documents: Vec<RawDocument>,

    /// Every call made, in order
    pub attempts: Vec<AttemptRecord>,

    /// Human-readable account of how the result was chosen
    pub explanation: String,

    pub total_time_ms: u64,
}

impl Retrieval {
    /// True when the first search attempt did not produce the result.
    pub fn fallback_occurred(&self) -> bool {
        self.attempts
            .first()
            .map(|a| a.outcome != OutcomeKind::Success)
            .unwrap_or(false)
    }
}

/// Terminal state of the chain.
#[derive(Debug, Clone)]
pub enum ChainOutcome {
    /// One strategy produced documents
    Found(Retrieval),

    /// The encyclopedic provider could not resolve the query to one page
    Ambiguous {
        options: Vec<String>,
        attempts: Vec<AttemptRecord>,
    },

    /// Both strategies came back empty
    Exhausted { attempts: Vec<AttemptRecord> },
}

impl ChainOutcome {
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            ChainOutcome::Found(retrieval) => &retrieval.attempts,
            ChainOutcome::Ambiguous { attempts, .. } => attempts,
            ChainOutcome::Exhausted { attempts } => attempts,
        }
    }
}

enum FallbackResult {
    Page(RawDocument),
    Ambiguous(Vec<String>),
    Nothing,
}

/// Ordered multi-backend retrieval with encyclopedic fallback.
pub struct RetrievalChain {
    search: Arc<dyn SearchProvider>,
    encyclopedia: Arc<dyn EncyclopediaProvider>,
    config: ChainConfig,
}

impl RetrievalChain {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        encyclopedia: Arc<dyn EncyclopediaProvider>,
        config: ChainConfig,
    ) -> Self {
        Self {
            search,
            encyclopedia,
            config,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Run both strategies for `query`.
    pub async fn retrieve(&self, query: &str) -> ChainOutcome {
        let start = Instant::now();
        let mut attempts = Vec::new();

        if let Some((backend, documents)) = self.search_backends(query, &mut attempts).await {
            let explanation = format!(
                "{} backend returned {} results after {} attempt(s)",
                backend,
                documents.len(),
                attempts.len()
            );
            return ChainOutcome::Found(Retrieval {
                method: RetrievalMethod::SearchEngine,
                documents,
                attempts,
                explanation,
                total_time_ms: start.elapsed().as_millis() as u64,
            });
        }

        info!("Search backends exhausted, switching to encyclopedia fallback");

        match self.encyclopedia_fallback(query, &mut attempts).await {
            FallbackResult::Page(document) => ChainOutcome::Found(Retrieval {
                method: RetrievalMethod::Encyclopedia,
                documents: vec![document],
                attempts,
                explanation: "All search backends came back empty; used encyclopedia page"
                    .to_string(),
                total_time_ms: start.elapsed().as_millis() as u64,
            }),
            FallbackResult::Ambiguous(mut options) => {
                options.truncate(self.config.max_options);
                info!(options = options.len(), "Encyclopedia reported an ambiguous topic");
                ChainOutcome::Ambiguous { options, attempts }
            }
            FallbackResult::Nothing => {
                warn!(attempts = attempts.len(), "All retrieval methods failed");
                ChainOutcome::Exhausted { attempts }
            }
        }
    }

    /// Strategy A. Returns the winning backend and its documents.
    async fn search_backends(
        &self,
        query: &str,
        attempts: &mut Vec<AttemptRecord>,
    ) -> Option<(SearchBackend, Vec<RawDocument>)> {
        for spec in &self.config.backends {
            for attempt in 1..=spec.max_attempts.max(1) {
                let call_start = Instant::now();
                let outcome = BackendOutcome::from_result(
                    self.search
                        .search(query, self.config.max_results, spec.backend)
                        .await,
                );
                let elapsed_ms = call_start.elapsed().as_millis() as u64;

                match outcome {
                    BackendOutcome::Success(mut documents) => {
                        documents.truncate(self.config.max_results);
                        debug!(
                            backend = %spec.backend,
                            results = documents.len(),
                            "Backend returned results"
                        );
                        attempts.push(AttemptRecord {
                            target: AttemptTarget::Search(spec.backend),
                            outcome: OutcomeKind::Success,
                            documents: documents.len(),
                            error: None,
                            elapsed_ms,
                        });
                        return Some((spec.backend, documents));
                    }
                    BackendOutcome::Empty => {
                        debug!(backend = %spec.backend, "Backend returned no results, pausing");
                        attempts.push(AttemptRecord {
                            target: AttemptTarget::Search(spec.backend),
                            outcome: OutcomeKind::Empty,
                            documents: 0,
                            error: None,
                            elapsed_ms,
                        });
                        tokio::time::sleep(self.config.empty_result_pause).await;
                        break;
                    }
                    BackendOutcome::Failed(error) => {
                        warn!(
                            backend = %spec.backend,
                            attempt,
                            max_attempts = spec.max_attempts,
                            error = %error,
                            "Backend failed"
                        );
                        attempts.push(AttemptRecord {
                            target: AttemptTarget::Search(spec.backend),
                            outcome: OutcomeKind::Failed,
                            documents: 0,
                            error: Some(error),
                            elapsed_ms,
                        });
                    }
                }
            }
        }

        None
    }

    /// Strategy B.
    async fn encyclopedia_fallback(
        &self,
        query: &str,
        attempts: &mut Vec<AttemptRecord>,
    ) -> FallbackResult {
        let call_start = Instant::now();
        let titles = self.encyclopedia.search_titles(query).await;
        let elapsed_ms = call_start.elapsed().as_millis() as u64;

        let titles = match titles {
            Ok(titles) => titles,
            Err(e) => {
                return self.fallback_error(
                    AttemptTarget::EncyclopediaSearch,
                    e,
                    elapsed_ms,
                    attempts,
                )
            }
        };

        let Some(top) = titles.into_iter().next() else {
            debug!("Encyclopedia search returned no titles");
            attempts.push(AttemptRecord {
                target: AttemptTarget::EncyclopediaSearch,
                outcome: OutcomeKind::Empty,
                documents: 0,
                error: None,
                elapsed_ms,
            });
            return FallbackResult::Nothing;
        };

        attempts.push(AttemptRecord {
            target: AttemptTarget::EncyclopediaSearch,
            outcome: OutcomeKind::Success,
            documents: 1,
            error: None,
            elapsed_ms,
        });

        let call_start = Instant::now();
        let page = self.encyclopedia.fetch_page(&top, false).await;
        let elapsed_ms = call_start.elapsed().as_millis() as u64;

        match page {
            Ok(page) => {
                debug!(title = %page.title, "Fetched encyclopedia page");
                attempts.push(AttemptRecord {
                    target: AttemptTarget::EncyclopediaPage,
                    outcome: OutcomeKind::Success,
                    documents: 1,
                    error: None,
                    elapsed_ms,
                });
                FallbackResult::Page(RawDocument {
                    title: Some(page.title),
                    url: Some(page.url),
                    body: Some(page.summary),
                    credibility: Some(self.encyclopedia.credibility_label().to_string()),
                    ..Default::default()
                })
            }
            Err(e) => self.fallback_error(AttemptTarget::EncyclopediaPage, e, elapsed_ms, attempts),
        }
    }

    fn fallback_error(
        &self,
        target: AttemptTarget,
        error: ProviderError,
        elapsed_ms: u64,
        attempts: &mut Vec<AttemptRecord>,
    ) -> FallbackResult {
        match error {
            ProviderError::Ambiguous { options } => {
                attempts.push(AttemptRecord {
                    target,
                    outcome: OutcomeKind::Ambiguous,
                    documents: 0,
                    error: None,
                    elapsed_ms,
                });
                FallbackResult::Ambiguous(options)
            }
            other => {
                warn!(target = %target, error = %other, "Encyclopedia fallback failed");
                attempts.push(AttemptRecord {
                    target,
                    outcome: OutcomeKind::Failed,
                    documents: 0,
                    error: Some(other.to_string()),
                    elapsed_ms,
                });
                FallbackResult::Nothing
            }
        }
    }
}
