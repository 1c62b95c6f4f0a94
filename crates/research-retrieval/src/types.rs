//! Core retrieval types.
//!
//! - `SearchBackend`: identifiers of the search backends tried in Strategy A
//! - `BackendSpec`: a backend plus its own transient-failure tolerance
//! - `BackendOutcome`: explicit success/empty/failed classification of a call
//! - `AttemptRecord`: one entry of the chain's attempt log

use std::fmt;
use std::str::FromStr;

use research_types::RawDocument;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderError;

/// Search backend identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchBackend {
    /// JSON answer API
    Api,
    /// Full HTML results page
    Html,
    /// Lightweight HTML results page
    Lite,
}

impl SearchBackend {
    /// Default order tried by the chain.
    pub const DEFAULT_ORDER: [SearchBackend; 3] =
        [SearchBackend::Api, SearchBackend::Html, SearchBackend::Lite];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchBackend::Api => "api",
            SearchBackend::Html => "html",
            SearchBackend::Lite => "lite",
        }
    }
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchBackend {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(SearchBackend::Api),
            "html" => Ok(SearchBackend::Html),
            "lite" => Ok(SearchBackend::Lite),
            other => Err(ProviderError::Unsupported(format!(
                "unknown search backend '{}'",
                other
            ))),
        }
    }
}

/// A backend entry in Strategy A, with its own failure tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSpec {
    pub backend: SearchBackend,

    /// Calls allowed before giving up on this backend (at least 1)
    pub max_attempts: u32,
}

impl BackendSpec {
    pub fn new(backend: SearchBackend) -> Self {
        Self {
            backend,
            max_attempts: 1,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Classified result of one backend call.
#[derive(Debug, Clone)]
pub enum BackendOutcome {
    /// At least one document
    Success(Vec<RawDocument>),
    /// Call succeeded but returned nothing
    Empty,
    /// Call raised a transport, status, or parse failure
    Failed(String),
}

impl BackendOutcome {
    /// Classify a provider result.
    pub fn from_result(result: Result<Vec<RawDocument>, ProviderError>) -> Self {
        match result {
            Ok(docs) if docs.is_empty() => BackendOutcome::Empty,
            Ok(docs) => BackendOutcome::Success(docs),
            Err(e) => BackendOutcome::Failed(e.to_string()),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            BackendOutcome::Success(_) => OutcomeKind::Success,
            BackendOutcome::Empty => OutcomeKind::Empty,
            BackendOutcome::Failed(_) => OutcomeKind::Failed,
        }
    }
}

/// Outcome classification without the payload, for attempt logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Empty,
    Failed,
    Ambiguous,
}

/// What a logged attempt targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptTarget {
    Search(SearchBackend),
    EncyclopediaSearch,
    EncyclopediaPage,
}

impl fmt::Display for AttemptTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptTarget::Search(backend) => write!(f, "search:{}", backend),
            AttemptTarget::EncyclopediaSearch => f.write_str("encyclopedia:search"),
            AttemptTarget::EncyclopediaPage => f.write_str("encyclopedia:page"),
        }
    }
}

/// One entry of the chain's attempt log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub target: AttemptTarget,
    pub outcome: OutcomeKind,
    /// Documents returned (0 unless the outcome is `Success`)
    pub documents: usize,
    /// Failure detail, if any
    pub error: Option<String>,
    pub elapsed_ms: u64,
}
