//! # research-retrieval
//!
//! Retrieval strategy engine for the research agent.
//!
//! This crate decides where source material comes from and how each source
//! is labelled:
//!
//! - **Search backends**: ordered list of web search backends, each with its
//!   own failure tolerance
//! - **Encyclopedic fallback**: a single canonical page when every backend
//!   comes back empty
//! - **Normalization**: one canonical `SourceRecord` shape for every backend
//! - **Credibility**: a URL heuristic for sources without their own label
//!
//! ## Usage
//!
//! ```rust,ignore
//! use research_retrieval::{ChainConfig, ChainOutcome, RetrievalChain};
//!
//! let chain = RetrievalChain::new(search, encyclopedia, ChainConfig::default());
//! match chain.retrieve("rust ownership").await {
//!     ChainOutcome::Found(retrieval) => {
//!         let records: Vec<_> = retrieval
//!             .documents
//!             .into_iter()
//!             .map(research_retrieval::into_source_record)
//!             .collect();
//!     }
//!     ChainOutcome::Ambiguous { options, .. } => println!("did you mean {:?}", options),
//!     ChainOutcome::Exhausted { .. } => println!("nothing found"),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: backend identifiers, outcomes, attempt log
//! - [`provider`]: collaborator traits and errors
//! - [`chain`]: the two-strategy retrieval chain
//! - [`normalize`]: raw document to `SourceRecord`
//! - [`credibility`]: URL credibility heuristic
//! - [`mock`]: in-memory providers for tests

pub mod chain;
pub mod credibility;
pub mod mock;
pub mod normalize;
pub mod provider;
pub mod types;

pub use chain::{ChainConfig, ChainOutcome, Retrieval, RetrievalChain};
pub use mock::{MockEncyclopedia, MockSearchProvider};
pub use normalize::{into_source_record, truncate_chars, MAX_TITLE_CHARS};
pub use provider::{EncyclopediaPage, EncyclopediaProvider, ProviderError, SearchProvider};
pub use types::{
    AttemptRecord, AttemptTarget, BackendOutcome, BackendSpec, OutcomeKind, SearchBackend,
};
