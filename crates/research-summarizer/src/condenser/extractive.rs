//! Local extractive condenser.
//!
//! Scores sentences by the frequency of their content words across the whole
//! text and keeps the best ones in their original order.

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use tiktoken_rs::CoreBPE;
use tracing::debug;

use super::{Condenser, CondenserError, LengthBudget};

static BPE: OnceLock<Option<CoreBPE>> = OnceLock::new();

/// Count tokens in text.
///
/// Uses tiktoken for accurate OpenAI token counting, falling back to a
/// len/4 estimate if the encoding cannot be loaded.
pub fn count_tokens(text: &str) -> usize {
    let bpe = BPE.get_or_init(|| tiktoken_rs::cl100k_base().ok());
    match bpe {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => (text.len() / 4).max(1),
    }
}

/// Frequency-based sentence extractor. Needs no network or model files.
#[derive(Debug, Clone, Default)]
pub struct ExtractiveCondenser;

impl ExtractiveCondenser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Condenser for ExtractiveCondenser {
    async fn condense(&self, text: &str, budget: LengthBudget) -> Result<String, CondenserError> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Err(CondenserError::EmptyInput);
        }

        let scores = score_sentences(&sentences);
        let mut ranked: Vec<usize> = (0..sentences.len()).collect();
        // Stable sort keeps earlier sentences ahead on ties
        ranked.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));

        let selected = match budget {
            LengthBudget::Sentences(n) => {
                let mut picked: Vec<usize> = ranked.into_iter().take(n.max(1) as usize).collect();
                picked.sort_unstable();
                picked
            }
            LengthBudget::Tokens { max, .. } => {
                let max = max.max(1) as usize;
                let mut used = 0;
                let mut picked = Vec::new();
                for idx in ranked.iter().copied() {
                    let cost = count_tokens(sentences[idx]);
                    if used + cost <= max {
                        used += cost;
                        picked.push(idx);
                    }
                }
                if picked.is_empty() {
                    // Nothing fits whole: cut the best sentence down to size
                    return Ok(truncate_to_tokens(sentences[ranked[0]], max));
                }
                picked.sort_unstable();
                picked
            }
        };

        debug!(
            sentences = sentences.len(),
            kept = selected.len(),
            budget = %budget,
            "Extractive condensation"
        );

        Ok(selected
            .into_iter()
            .map(|i| sentences[i])
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn name(&self) -> &str {
        "extractive"
    }
}

/// Split text into trimmed sentences on terminal punctuation.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                push_sentence(&mut sentences, &text[start..end]);
                start = end;
            }
        }
    }
    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate.trim();
    if trimmed.chars().any(char::is_alphanumeric) {
        sentences.push(trimmed);
    }
}

fn content_words(sentence: &str) -> impl Iterator<Item = String> + '_ {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(str::to_lowercase)
        .filter(|w| !is_stopword(w))
}

/// Average document frequency of each sentence's content words.
fn score_sentences(sentences: &[&str]) -> Vec<f64> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for sentence in sentences {
        for word in content_words(sentence) {
            *freq.entry(word).or_insert(0) += 1;
        }
    }

    sentences
        .iter()
        .map(|sentence| {
            let (total, count) = content_words(sentence)
                .fold((0usize, 0usize), |(total, count), w| {
                    (total + freq.get(&w).copied().unwrap_or(0), count + 1)
                });
            if count == 0 {
                0.0
            } else {
                total as f64 / count as f64
            }
        })
        .collect()
}

/// Keep whole words from the front of `text` while under `max` tokens.
fn truncate_to_tokens(text: &str, max: usize) -> String {
    let mut out = String::new();
    for word in text.split_whitespace() {
        let candidate = if out.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", out, word)
        };
        if count_tokens(&candidate) > max {
            break;
        }
        out = candidate;
    }
    out
}

fn is_stopword(word: &str) -> bool {
    const STOPWORDS: &[&str] = &[
        "the", "and", "for", "that", "this", "with", "from", "have", "has", "been", "were",
        "will", "would", "could", "should", "there", "their", "what", "when", "where", "which",
        "about", "into", "through", "also", "they", "them", "than", "then", "such", "these",
        "those", "some", "more", "most", "other", "only", "over", "very",
    ];
    STOPWORDS.contains(&word)
}
