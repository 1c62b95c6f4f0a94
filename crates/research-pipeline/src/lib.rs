//! # research-pipeline
//!
//! Ties the crates together: topic screening, the retrieval chain, the
//! summary dispatcher and the preference store behind two operations,
//! [`ResearchPipeline::run_research`] and
//! [`ResearchPipeline::submit_feedback`].

pub mod config;
pub mod pipeline;
pub mod safety;

pub use config::{PipelineConfig, MAX_SOURCES};
pub use pipeline::ResearchPipeline;
pub use safety::{KeywordSafetyFilter, SafetyPredicate, DEFAULT_BLOCKED_TERMS};
