//! Source documents.
//!
//! Backends disagree on field names (`body` vs `content`, `href` vs `url`).
//! `RawDocument` accepts the union of those shapes; only the normalization
//! step in `research-retrieval` reads it and produces a `SourceRecord`.

use serde::{Deserialize, Serialize};

/// Placeholder URL for sources without a locator.
pub const MISSING_URL: &str = "#";

/// Placeholder title for sources without one.
pub const UNTITLED: &str = "Untitled";

/// A document as returned by a retrieval backend, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Credibility label supplied by the backend itself, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credibility: Option<String>,
}

impl RawDocument {
    /// Create a search-style document (`title`, `href`, `body`).
    pub fn search_hit(
        title: impl Into<String>,
        href: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            href: Some(href.into()),
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Attach a pre-assigned credibility label.
    pub fn with_credibility(mut self, label: impl Into<String>) -> Self {
        self.credibility = Some(label.into());
        self
    }
}

/// One retrieved document in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Display title (at most 100 characters)
    pub title: String,

    /// Locator, or `MISSING_URL`
    pub url: String,

    /// Body excerpt used for summarization
    pub body: String,

    /// Credibility label
    pub credibility: String,
}
