//! # research-types
//!
//! Shared domain types for the research agent.
//!
//! This crate defines the data structures passed between the other crates:
//! - Preferences: the persisted summary-length state and feedback signals
//! - Sources: raw backend documents and the canonical `SourceRecord`
//! - Reports: the pipeline's terminal output and status outcomes
//! - Settings: layered configuration for the binary
//!
//! ## Usage
//!
//! ```rust
//! use research_types::{FeedbackSignal, PreferenceState};
//!
//! let state = PreferenceState::default();
//! assert_eq!(state.preferred_summary_length, 150);
//! assert_eq!("too long".parse::<FeedbackSignal>().unwrap(), FeedbackSignal::TooLong);
//! ```

pub mod config;
pub mod error;
pub mod preferences;
pub mod report;
pub mod source;

pub use config::{
    EncyclopediaSettings, PipelineProfile, SafetySettings, SearchSettings, Settings,
    SummarizerSettings,
};
pub use error::ResearchError;
pub use preferences::{
    CredibilityPriority, FeedbackSignal, PreferenceState, DEFAULT_SUMMARY_LENGTH,
    FEEDBACK_STEP, MAX_SUMMARY_LENGTH, MIN_SUMMARY_LENGTH,
};
pub use report::{Report, ResearchOutcome, RetrievalMethod, StatusMessage};
pub use source::{RawDocument, SourceRecord, MISSING_URL, UNTITLED};
