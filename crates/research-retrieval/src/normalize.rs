//! Normalization of backend documents into `SourceRecord`s.
//!
//! Every backend-specific shape goes through `into_source_record` before any
//! downstream code sees it.

use research_types::{RawDocument, SourceRecord, MISSING_URL, UNTITLED};

use crate::credibility;

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Convert a raw document into its canonical form.
///
/// - title: `title`, else "Untitled"; truncated to `MAX_TITLE_CHARS`
/// - url: `href`, else `url`, else "#"
/// - body: `body`, else `content`, else empty
/// - credibility: the backend's own label, else scored from the URL. An
///   absent URL scores as unknown, not as the "#" placeholder.
pub fn into_source_record(raw: RawDocument) -> SourceRecord {
    let RawDocument {
        title,
        url,
        href,
        body,
        content,
        credibility,
    } = raw;

    let locator = non_empty(href).or_else(|| non_empty(url));
    let credibility = credibility
        .unwrap_or_else(|| credibility::score(locator.as_deref().unwrap_or("")).to_string());

    SourceRecord {
        title: truncate_chars(title.as_deref().unwrap_or(UNTITLED), MAX_TITLE_CHARS),
        url: locator.unwrap_or_else(|| MISSING_URL.to_string()),
        body: body.or(content).unwrap_or_default(),
        credibility,
    }
}

/// Truncate on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
