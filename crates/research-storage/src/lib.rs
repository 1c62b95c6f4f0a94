//! Storage layer for the research agent.
//!
//! Provides the file-backed preference store with:
//! - Lazy seeding from a default record or hard-coded values
//! - Corruption recovery (malformed files are reseeded, never surfaced)
//! - Whole-record read-modify-write updates
//! - Feedback-driven adjustment of the preferred summary length

pub mod error;
pub mod preferences;

pub use error::StorageError;
pub use preferences::PreferenceStore;
