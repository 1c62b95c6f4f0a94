//! In-memory providers for testing.
//!
//! Both mocks record every call so tests can assert which backends were
//! touched (or that none were).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use research_types::RawDocument;

use crate::provider::{EncyclopediaPage, EncyclopediaProvider, ProviderError, SearchProvider};
use crate::types::SearchBackend;

/// Mock search provider with per-backend canned results.
///
/// Backends without configured results return an empty list.
#[derive(Default)]
pub struct MockSearchProvider {
    /// Results to return for each backend
    pub results: HashMap<SearchBackend, Vec<RawDocument>>,
    /// Backends that always fail
    pub fail_backends: HashSet<SearchBackend>,
    transient_failures: Mutex<HashMap<SearchBackend, usize>>,
    ignore_limit: bool,
    calls: Mutex<Vec<SearchBackend>>,
}

impl MockSearchProvider {
    /// Add results for a backend.
    pub fn with_results(mut self, backend: SearchBackend, results: Vec<RawDocument>) -> Self {
        self.results.insert(backend, results);
        self
    }

    /// Mark a backend as always failing.
    pub fn with_failure(mut self, backend: SearchBackend) -> Self {
        self.fail_backends.insert(backend);
        self
    }

    /// Fail the next `times` calls to a backend, then behave normally.
    pub fn with_transient_failures(self, backend: SearchBackend, times: usize) -> Self {
        self.transient_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(backend, times);
        self
    }

    /// Return every configured result regardless of `max_results`.
    pub fn ignoring_limit(mut self) -> Self {
        self.ignore_limit = true;
        self
    }

    /// Backends called so far, in order.
    pub fn calls(&self) -> Vec<SearchBackend> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(
        &self,
        _query: &str,
        max_results: usize,
        backend: SearchBackend,
    ) -> Result<Vec<RawDocument>, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(backend);

        {
            let mut transient = self
                .transient_failures
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if let Some(remaining) = transient.get_mut(&backend) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ProviderError::Transport(format!(
                        "{} backend temporarily unavailable",
                        backend
                    )));
                }
            }
        }

        if self.fail_backends.contains(&backend) {
            return Err(ProviderError::Transport(format!("{} backend failed", backend)));
        }

        let results = self.results.get(&backend).cloned().unwrap_or_default();
        if self.ignore_limit {
            Ok(results)
        } else {
            Ok(results.into_iter().take(max_results).collect())
        }
    }
}

/// Mock encyclopedic provider.
#[derive(Default)]
pub struct MockEncyclopedia {
    titles: Vec<String>,
    pages: HashMap<String, EncyclopediaPage>,
    ambiguous: Option<Vec<String>>,
    failing: bool,
    title_searches: AtomicUsize,
    fetches: Mutex<Vec<(String, bool)>>,
}

impl MockEncyclopedia {
    /// Titles returned by `search_titles`.
    pub fn with_titles(mut self, titles: Vec<String>) -> Self {
        self.titles = titles;
        self
    }

    /// Add a fetchable page; its title is appended to the search results.
    pub fn with_page(
        mut self,
        title: impl Into<String>,
        url: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        let title = title.into();
        if !self.titles.contains(&title) {
            self.titles.push(title.clone());
        }
        self.pages.insert(
            title.clone(),
            EncyclopediaPage {
                title,
                url: url.into(),
                summary: summary.into(),
            },
        );
        self
    }

    /// Make every page fetch report ambiguity with these options.
    pub fn with_ambiguous(mut self, options: Vec<String>) -> Self {
        self.ambiguous = Some(options);
        self
    }

    /// Make every call fail with a transport error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn title_searches(&self) -> usize {
        self.title_searches.load(Ordering::SeqCst)
    }

    /// `(title, auto_suggest)` for every page fetch, in order.
    pub fn fetches(&self) -> Vec<(String, bool)> {
        self.fetches.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl EncyclopediaProvider for MockEncyclopedia {
    async fn search_titles(&self, _query: &str) -> Result<Vec<String>, ProviderError> {
        self.title_searches.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ProviderError::Transport("encyclopedia unreachable".to_string()));
        }
        Ok(self.titles.clone())
    }

    async fn fetch_page(
        &self,
        title: &str,
        auto_suggest: bool,
    ) -> Result<EncyclopediaPage, ProviderError> {
        self.fetches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((title.to_string(), auto_suggest));

        if self.failing {
            return Err(ProviderError::Transport("encyclopedia unreachable".to_string()));
        }
        if let Some(options) = &self.ambiguous {
            return Err(ProviderError::Ambiguous {
                options: options.clone(),
            });
        }
        self.pages
            .get(title)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(title.to_string()))
    }
}
