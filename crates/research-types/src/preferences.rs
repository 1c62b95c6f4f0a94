//! Persisted preference state and feedback signals.
//!
//! The preference record is a small JSON object. Only
//! `preferred_summary_length` drives behavior today; `credibility_priority`
//! is part of the persisted shape but not consulted by any logic.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResearchError;

/// Summary length used when nothing has been persisted yet.
pub const DEFAULT_SUMMARY_LENGTH: u32 = 150;

/// Lower bound for the preferred summary length.
pub const MIN_SUMMARY_LENGTH: u32 = 80;

/// Upper bound for the preferred summary length.
pub const MAX_SUMMARY_LENGTH: u32 = 400;

/// Amount a single feedback signal moves the preferred length.
pub const FEEDBACK_STEP: u32 = 30;

/// How strongly the user prefers high-credibility sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredibilityPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl CredibilityPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredibilityPriority::Low => "low",
            CredibilityPriority::Medium => "medium",
            CredibilityPriority::High => "high",
        }
    }
}

/// The persisted user preference record.
///
/// Keys this version does not know about are kept in `extra` so that a
/// read-modify-write cycle never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceState {
    /// Target summary length in tokens
    #[serde(default = "default_summary_length")]
    pub preferred_summary_length: u32,

    /// Credibility preference (persisted, currently unused)
    #[serde(default)]
    pub credibility_priority: CredibilityPriority,

    /// Unrecognized keys carried through unchanged
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_summary_length() -> u32 {
    DEFAULT_SUMMARY_LENGTH
}

impl Default for PreferenceState {
    fn default() -> Self {
        Self {
            preferred_summary_length: DEFAULT_SUMMARY_LENGTH,
            credibility_priority: CredibilityPriority::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl PreferenceState {
    /// Return a copy with `preferred_summary_length` clamped into
    /// `[MIN_SUMMARY_LENGTH, MAX_SUMMARY_LENGTH]`.
    pub fn clamped(mut self) -> Self {
        self.preferred_summary_length = self
            .preferred_summary_length
            .clamp(MIN_SUMMARY_LENGTH, MAX_SUMMARY_LENGTH);
        self
    }

    /// Check whether the length sits inside the allowed bound.
    pub fn is_within_bounds(&self) -> bool {
        (MIN_SUMMARY_LENGTH..=MAX_SUMMARY_LENGTH).contains(&self.preferred_summary_length)
    }

    /// Length that results from applying `signal` to the current state.
    ///
    /// `TooLong` shortens by `FEEDBACK_STEP` down to the floor, `TooShort`
    /// lengthens up to the cap, `Good` leaves the value alone.
    pub fn adjusted_length(&self, signal: FeedbackSignal) -> u32 {
        let current = self.preferred_summary_length;
        match signal {
            FeedbackSignal::TooLong => {
                current.saturating_sub(FEEDBACK_STEP).max(MIN_SUMMARY_LENGTH)
            }
            FeedbackSignal::TooShort => {
                current.saturating_add(FEEDBACK_STEP).min(MAX_SUMMARY_LENGTH)
            }
            FeedbackSignal::Good => current,
        }
    }
}

/// User feedback about the length of the last summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSignal {
    /// Summary was too long; shorten future summaries
    TooLong,
    /// Summary length was right
    Good,
    /// Summary was too short; lengthen future summaries
    TooShort,
}

impl FeedbackSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackSignal::TooLong => "too_long",
            FeedbackSignal::Good => "good",
            FeedbackSignal::TooShort => "too_short",
        }
    }
}

impl fmt::Display for FeedbackSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackSignal {
    type Err = ResearchError;

    /// Accepts `too_long`, `too long` and `too-long` spellings (and the same
    /// for `too_short`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "too_long" => Ok(FeedbackSignal::TooLong),
            "good" => Ok(FeedbackSignal::Good),
            "too_short" => Ok(FeedbackSignal::TooShort),
            _ => Err(ResearchError::InvalidInput(format!(
                "unknown feedback signal '{}' (expected too_long, good or too_short)",
                s
            ))),
        }
    }
}
