//! Condensation engine trait and implementations.
//!
//! A condenser takes raw text plus a length budget and returns shorter text.
//! Two real engines ship with the crate:
//! - `ApiCondenser`: abstractive, calls an OpenAI-compatible or Anthropic API
//! - `ExtractiveCondenser`: local, picks the highest-scoring sentences

mod api;
mod extractive;
mod mock;

pub use api::{ApiCondenser, ApiCondenserConfig};
pub use extractive::{count_tokens, ExtractiveCondenser};
pub use mock::MockCondenser;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for condensation operations.
#[derive(Debug, Error)]
pub enum CondenserError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("No text to condense")]
    EmptyInput,

    #[error("Engine failure: {0}")]
    Engine(String),
}

/// Target length for a condensed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthBudget {
    /// Token range passed straight through to the engine
    Tokens { max: u32, min: u32 },
    /// Number of sentences to keep
    Sentences(u32),
}

impl LengthBudget {
    /// Token budget with the minimum at half the maximum.
    pub fn tokens(max: u32) -> Self {
        LengthBudget::Tokens { max, min: max / 2 }
    }

    /// Sentence budget equivalent to `tokens` at `tokens_per_sentence`.
    ///
    /// Rounds to the nearest sentence and never goes below one.
    pub fn sentences_for_tokens(tokens: u32, tokens_per_sentence: u32) -> Self {
        let per_sentence = tokens_per_sentence.max(1);
        let sentences = (tokens + per_sentence / 2) / per_sentence;
        LengthBudget::Sentences(sentences.max(1))
    }

    /// Rough upper bound on output tokens, for engines that need one.
    pub fn max_tokens_hint(&self) -> u32 {
        match self {
            LengthBudget::Tokens { max, .. } => *max,
            LengthBudget::Sentences(n) => n.saturating_mul(40),
        }
    }
}

impl fmt::Display for LengthBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthBudget::Tokens { max, min } => write!(f, "{}-{} tokens", min, max),
            LengthBudget::Sentences(n) => write!(f, "{} sentences", n),
        }
    }
}

/// Pluggable condensation engine.
#[async_trait]
pub trait Condenser: Send + Sync {
    /// Condense `text` to fit `budget`.
    async fn condense(&self, text: &str, budget: LengthBudget) -> Result<String, CondenserError>;

    /// Short engine name for logs.
    fn name(&self) -> &str;
}
