//! Pipeline output types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::SourceRecord;

/// Which retrieval strategy produced the sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMethod {
    /// Free-text web search backends
    SearchEngine,
    /// Encyclopedic fallback provider
    Encyclopedia,
}

impl RetrievalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMethod::SearchEngine => "Search Engine",
            RetrievalMethod::Encyclopedia => "Encyclopedia",
        }
    }
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of a successful research run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Topic as submitted
    pub topic: String,

    /// Condensed summary, or an inline degradation message
    pub summary: String,

    /// Sources in retrieval order (at most 5)
    pub sources: Vec<SourceRecord>,

    /// Strategy that produced the sources
    pub method: RetrievalMethod,

    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
}

/// Terminal, user-facing outcomes that are not reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusMessage {
    /// Topic was empty or whitespace only
    EmptyTopic,
    /// Topic failed the safety predicate
    Rejected,
    /// Encyclopedic provider could not pick one page
    Ambiguous { options: Vec<String> },
    /// Every retrieval strategy came back empty
    AllMethodsFailed,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::EmptyTopic => f.write_str("Please enter a valid topic."),
            StatusMessage::Rejected => f.write_str("Request denied for safety reasons."),
            StatusMessage::Ambiguous { options } => write!(
                f,
                "Topic is too ambiguous. Did you mean: {}?",
                options.join(", ")
            ),
            StatusMessage::AllMethodsFailed => {
                f.write_str("All research methods failed. Please try again later.")
            }
        }
    }
}

/// What `run_research` hands back: a report or a status message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResearchOutcome {
    Report(Report),
    Status(StatusMessage),
}

impl ResearchOutcome {
    pub fn is_report(&self) -> bool {
        matches!(self, ResearchOutcome::Report(_))
    }

    pub fn as_report(&self) -> Option<&Report> {
        match self {
            ResearchOutcome::Report(report) => Some(report),
            ResearchOutcome::Status(_) => None,
        }
    }

    pub fn as_status(&self) -> Option<&StatusMessage> {
        match self {
            ResearchOutcome::Report(_) => None,
            ResearchOutcome::Status(status) => Some(status),
        }
    }
}

impl From<StatusMessage> for ResearchOutcome {
    fn from(status: StatusMessage) -> Self {
        ResearchOutcome::Status(status)
    }
}

impl From<Report> for ResearchOutcome {
    fn from(report: Report) -> Self {
        ResearchOutcome::Report(report)
    }
}
