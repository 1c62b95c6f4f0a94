//! Provider traits for the retrieval collaborators.
//!
//! The chain only knows these interfaces. Concrete web clients live in
//! `research-web`; `crate::mock` has in-memory doubles for tests.

use async_trait::async_trait;
use research_types::RawDocument;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SearchBackend;

/// Errors raised by retrieval providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or connection failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Provider is rate limiting us
    #[error("Rate limited")]
    RateLimited,

    /// Response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested page does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend or option the provider does not handle
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Query matches several pages; carries candidate titles.
    ///
    /// This is a distinguished signal, not an ordinary failure.
    #[error("Ambiguous query ({} options)", options.len())]
    Ambiguous { options: Vec<String> },
}

impl ProviderError {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ProviderError::Ambiguous { .. })
    }
}

/// A canonical page from the encyclopedic provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncyclopediaPage {
    pub title: String,
    pub url: String,
    /// Lead-section summary
    pub summary: String,
}

/// Free-text search provider (Strategy A).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search `backend` for `query`, returning at most `max_results`
    /// documents in ranked order.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        backend: SearchBackend,
    ) -> Result<Vec<RawDocument>, ProviderError>;
}

/// Encyclopedic fallback provider (Strategy B).
#[async_trait]
pub trait EncyclopediaProvider: Send + Sync {
    /// Candidate page titles for a query, best first.
    async fn search_titles(&self, query: &str) -> Result<Vec<String>, ProviderError>;

    /// Fetch one page. With `auto_suggest` false the exact title is used.
    ///
    /// Returns `ProviderError::Ambiguous` for disambiguation pages.
    async fn fetch_page(
        &self,
        title: &str,
        auto_suggest: bool,
    ) -> Result<EncyclopediaPage, ProviderError>;

    /// Credibility label attached to pages from this provider.
    fn credibility_label(&self) -> &str {
        "High credibility (Wikipedia)"
    }
}
