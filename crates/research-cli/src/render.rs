//! Report rendering for the terminal.

use research_types::ResearchOutcome;

/// Render an outcome as Markdown.
pub fn render_markdown(outcome: &ResearchOutcome) -> String {
    let report = match outcome {
        ResearchOutcome::Status(status) => return format!("**Status:** {}\n", status),
        ResearchOutcome::Report(report) => report,
    };

    let mut out = format!("# Research Summary: {}\n", title_case(&report.topic));
    out.push_str(&format!("*(Source: {})*\n\n", report.method));
    out.push_str(&report.summary);
    out.push_str("\n\n---\n### References\n");
    for source in &report.sources {
        out.push_str(&format!(
            "* [{}]({}) - _{}_\n",
            source.title, source.url, source.credibility
        ));
    }
    out
}

/// Render an outcome as pretty-printed JSON.
pub fn render_json(outcome: &ResearchOutcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(outcome)
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// A word starts after any non-alphabetic character, so "rust's" becomes
/// "Rust'S".
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
