//! Topic screening.

use research_types::SafetySettings;
use tracing::info;

/// Terms that reject a topic when found anywhere in it, ignoring case.
pub const DEFAULT_BLOCKED_TERMS: &[&str] =
    &["how to make a bomb", "suicide", "harm", "weapons", "kill"];

/// Decides whether a topic may be researched.
pub trait SafetyPredicate: Send + Sync {
    fn is_safe(&self, topic: &str) -> bool;
}

impl<F> SafetyPredicate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_safe(&self, topic: &str) -> bool {
        self(topic)
    }
}

/// Case-insensitive substring blocklist.
///
/// Matching is plain substring: "harm" also blocks "pharmacy".
#[derive(Debug, Clone)]
pub struct KeywordSafetyFilter {
    terms: Vec<String>,
}

impl Default for KeywordSafetyFilter {
    fn default() -> Self {
        Self {
            terms: DEFAULT_BLOCKED_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl KeywordSafetyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add terms on top of the defaults. Blank terms are ignored.
    pub fn with_extra_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !self.terms.contains(&term) {
                self.terms.push(term);
            }
        }
        self
    }

    pub fn from_settings(settings: &SafetySettings) -> Self {
        Self::default().with_extra_terms(&settings.extra_blocked_terms)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl SafetyPredicate for KeywordSafetyFilter {
    fn is_safe(&self, topic: &str) -> bool {
        let lowered = topic.to_lowercase();
        match self.terms.iter().find(|t| lowered.contains(t.as_str())) {
            Some(term) => {
                info!(term = %term, "Topic matched blocked term");
                false
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_terms_block() {
        let filter = KeywordSafetyFilter::new();
        assert!(!filter.is_safe("How To Make A Bomb at home"));
        assert!(!filter.is_safe("history of WEAPONS"));
        assert!(!filter.is_safe("killer whales"));
        assert!(filter.is_safe("rust ownership"));
    }

    #[test]
    fn test_substring_matching_is_broad() {
        let filter = KeywordSafetyFilter::new();
        assert!(!filter.is_safe("pharmacy careers"));
    }

    #[test]
    fn test_extra_terms() {
        let filter = KeywordSafetyFilter::new().with_extra_terms(["  Poison ", "", "kill"]);
        assert_eq!(filter.terms().len(), DEFAULT_BLOCKED_TERMS.len() + 1);
        assert!(!filter.is_safe("poison ivy"));
    }

    #[test]
    fn test_from_settings() {
        let settings = SafetySettings {
            extra_blocked_terms: vec!["malware".to_string()],
        };
        let filter = KeywordSafetyFilter::from_settings(&settings);
        assert!(!filter.is_safe("Writing MALWARE"));
    }

    #[test]
    fn test_closure_predicate() {
        let allow_all = |_: &str| true;
        assert!(allow_all.is_safe("anything"));
        let short_only = |topic: &str| topic.len() < 5;
        assert!(!short_only.is_safe("too long"));
    }
}
