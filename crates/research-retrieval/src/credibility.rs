//! URL credibility heuristic.
//!
//! First match wins, using a case-sensitive substring test on the raw URL.
//! This is not TLD parsing: "https://example.com/org-chart" scores as
//! `.org`. The behavior is kept as-is and pinned by tests.

pub const UNKNOWN_SOURCE: &str = "Unknown Source";
pub const HIGH_EDU: &str = "High credibility (.edu)";
pub const HIGH_GOV: &str = "High credibility (.gov)";
pub const MEDIUM_ORG: &str = "Medium credibility (.org)";
pub const LOW: &str = "Low credibility";

/// Map a source URL to a credibility label.
pub fn score(url: &str) -> &'static str {
    if url.is_empty() {
        UNKNOWN_SOURCE
    } else if url.contains("edu") {
        HIGH_EDU
    } else if url.contains("gov") {
        HIGH_GOV
    } else if url.contains("org") {
        MEDIUM_ORG
    } else {
        LOW
    }
}
