//! Summary dispatch by retrieval method.
//!
//! Encyclopedia text is already a summary and is only cut to length. Search
//! engine text goes through the condenser with a budget taken from the
//! current preference state.

use std::sync::Arc;

use research_storage::PreferenceStore;
use research_types::RetrievalMethod;
use tracing::{debug, warn};

use crate::condenser::{Condenser, LengthBudget};

/// Summary returned when search text is too short to condense.
pub const NOT_ENOUGH_DATA: &str = "Not enough data to summarize.";

/// How the preferred summary length is turned into a condenser budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetMode {
    /// Pass the length through as a token range
    Tokens,
    /// Convert the length to a sentence count
    Sentences { tokens_per_sentence: u32 },
}

/// Dispatcher tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryConfig {
    /// Char limit applied to encyclopedia text
    pub encyclopedia_char_limit: usize,
    /// Char limit applied to search text before condensing
    pub search_char_limit: usize,
    /// Search text below this many chars is not condensed
    pub min_viable_chars: usize,
    pub budget_mode: BudgetMode,
}

impl SummaryConfig {
    /// Tunables for an abstractive engine.
    pub fn abstractive() -> Self {
        Self {
            encyclopedia_char_limit: 1500,
            search_char_limit: 3000,
            min_viable_chars: 50,
            budget_mode: BudgetMode::Tokens,
        }
    }

    /// Tunables for the extractive engine.
    pub fn extractive() -> Self {
        Self {
            encyclopedia_char_limit: 2000,
            search_char_limit: 3000,
            min_viable_chars: 50,
            budget_mode: BudgetMode::Sentences {
                tokens_per_sentence: 20,
            },
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self::extractive()
    }
}

/// Chooses and runs the summarization strategy for a retrieval.
pub struct SummaryDispatcher {
    condenser: Arc<dyn Condenser>,
    preferences: Arc<PreferenceStore>,
    config: SummaryConfig,
}

impl SummaryDispatcher {
    pub fn new(
        condenser: Arc<dyn Condenser>,
        preferences: Arc<PreferenceStore>,
        config: SummaryConfig,
    ) -> Self {
        Self {
            condenser,
            preferences,
            config,
        }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Budget for the current preference state.
    pub fn budget(&self) -> LengthBudget {
        let length = self.preferences.load().preferred_summary_length;
        match self.config.budget_mode {
            BudgetMode::Tokens => LengthBudget::tokens(length),
            BudgetMode::Sentences {
                tokens_per_sentence,
            } => LengthBudget::sentences_for_tokens(length, tokens_per_sentence),
        }
    }

    /// Produce the summary text for `combined`.
    ///
    /// Never fails: condenser errors come back as an inline error summary.
    pub async fn summarize(&self, combined: &str, method: RetrievalMethod) -> String {
        match method {
            RetrievalMethod::Encyclopedia => {
                truncate_chars(combined, self.config.encyclopedia_char_limit)
            }
            RetrievalMethod::SearchEngine => {
                if combined.trim().chars().count() < self.config.min_viable_chars {
                    debug!(chars = combined.len(), "Too little text to condense");
                    return NOT_ENOUGH_DATA.to_string();
                }

                let input = truncate_chars(combined, self.config.search_char_limit);
                let budget = self.budget();
                debug!(
                    engine = self.condenser.name(),
                    input_chars = input.chars().count(),
                    budget = %budget,
                    "Condensing search results"
                );

                match self.condenser.condense(&input, budget).await {
                    Ok(summary) => summary,
                    Err(e) => {
                        warn!(engine = self.condenser.name(), error = %e, "Condensation failed");
                        format!("Summarizer error: {}", e)
                    }
                }
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
