//! DuckDuckGo search provider.
//!
//! Three backends share one provider:
//! - `api`: Instant Answer JSON (abstract plus related topics)
//! - `html`: the no-JS HTML results page
//! - `lite`: the minimal table-based results page

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use research_retrieval::{ProviderError, SearchBackend, SearchProvider};
use research_types::{RawDocument, SearchSettings};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::http::{build_client, compact_ws, fetch_json, fetch_text};

/// Endpoints and client options for DuckDuckGo.
#[derive(Debug, Clone)]
pub struct DuckDuckGoConfig {
    pub api_url: String,
    pub html_url: String,
    pub lite_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.duckduckgo.com/".to_string(),
            html_url: "https://html.duckduckgo.com/html/".to_string(),
            lite_url: "https://lite.duckduckgo.com/lite/".to_string(),
            timeout: Duration::from_secs(15),
            user_agent: format!("research-agent/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DuckDuckGoConfig {
    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.timeout_secs),
            user_agent: settings.user_agent.clone(),
            ..Default::default()
        }
    }

    /// Point all three backends at one base URL (used by tests).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.api_url = format!("{}/", base);
        self.html_url = format!("{}/html/", base);
        self.lite_url = format!("{}/lite/", base);
        self
    }
}

/// Search provider backed by DuckDuckGo.
pub struct DuckDuckGoProvider {
    client: Client,
    config: DuckDuckGoConfig,
}

impl DuckDuckGoProvider {
    pub fn new(config: DuckDuckGoConfig) -> Result<Self, ProviderError> {
        let client = build_client(config.timeout, &config.user_agent)?;
        Ok(Self { client, config })
    }

    async fn search_api(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RawDocument>, ProviderError> {
        let request = self.client.get(&self.config.api_url).query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ]);
        let answer: InstantAnswer = fetch_json(request).await?;
        Ok(parse_instant_answer(answer, max_results))
    }

    async fn search_html(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RawDocument>, ProviderError> {
        let request = self
            .client
            .post(&self.config.html_url)
            .form(&[("q", query)]);
        let html = fetch_text(request).await?;
        Ok(parse_html_results(&html, max_results))
    }

    async fn search_lite(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RawDocument>, ProviderError> {
        let request = self
            .client
            .post(&self.config.lite_url)
            .form(&[("q", query)]);
        let html = fetch_text(request).await?;
        Ok(parse_lite_results(&html, max_results))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        backend: SearchBackend,
    ) -> Result<Vec<RawDocument>, ProviderError> {
        debug!(backend = %backend, query, max_results, "DuckDuckGo search");
        match backend {
            SearchBackend::Api => self.search_api(query, max_results).await,
            SearchBackend::Html => self.search_html(query, max_results).await,
            SearchBackend::Lite => self.search_lite(query, max_results).await,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Topic {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

fn parse_instant_answer(answer: InstantAnswer, limit: usize) -> Vec<RawDocument> {
    let mut out = Vec::new();

    if !answer.abstract_text.trim().is_empty() {
        out.push(RawDocument::search_hit(
            answer.heading.trim(),
            answer.abstract_url.trim(),
            answer.abstract_text.trim(),
        ));
    }

    let mut stack: Vec<RelatedTopic> = answer.related_topics.into_iter().rev().collect();
    while let Some(topic) = stack.pop() {
        if out.len() >= limit {
            break;
        }
        match topic {
            RelatedTopic::Topic { text, first_url } => {
                if text.trim().is_empty() {
                    continue;
                }
                // Related topic text reads "Title - description"
                let title = text
                    .split_once(" - ")
                    .map_or(text.as_str(), |(title, _)| title)
                    .trim()
                    .to_string();
                out.push(RawDocument::search_hit(title, first_url, text.trim()));
            }
            RelatedTopic::Group { topics } => stack.extend(topics.into_iter().rev()),
        }
    }

    out.truncate(limit);
    out
}

fn text_content(elem: ElementRef<'_>) -> String {
    compact_ws(&elem.text().collect::<Vec<_>>().join(" "))
}

fn parse_html_results(html: &str, limit: usize) -> Vec<RawDocument> {
    let document = Html::parse_document(html);
    let (Ok(container_sel), Ok(title_sel), Ok(snippet_sel)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut seen = HashSet::new();

    for container in document.select(&container_sel) {
        if out.len() >= limit {
            break;
        }
        let Some(anchor) = container.select(&title_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href").and_then(normalize_result_href) else {
            continue;
        };
        if !seen.insert(href.clone()) {
            continue;
        }
        let body = container
            .select(&snippet_sel)
            .next()
            .map(text_content)
            .unwrap_or_default();
        out.push(RawDocument::search_hit(text_content(anchor), href, body));
    }

    out
}

fn parse_lite_results(html: &str, limit: usize) -> Vec<RawDocument> {
    let document = Html::parse_document(html);
    let (Ok(link_sel), Ok(snippet_sel)) = (
        Selector::parse("a.result-link"),
        Selector::parse("td.result-snippet"),
    ) else {
        return Vec::new();
    };

    // The lite page lays links and snippets out in parallel table rows
    let snippets: Vec<String> = document.select(&snippet_sel).map(text_content).collect();

    let mut out = Vec::new();
    let mut seen = HashSet::new();

    for (i, anchor) in document.select(&link_sel).enumerate() {
        if out.len() >= limit {
            break;
        }
        let Some(href) = anchor.value().attr("href").and_then(normalize_result_href) else {
            continue;
        };
        if !seen.insert(href.clone()) {
            continue;
        }
        let body = snippets.get(i).cloned().unwrap_or_default();
        out.push(RawDocument::search_hit(text_content(anchor), href, body));
    }

    out
}

/// Resolve a result link to the destination URL.
///
/// DuckDuckGo wraps results in `/l/?uddg=<encoded target>` redirects.
fn normalize_result_href(href: &str) -> Option<String> {
    let trimmed = href.trim();
    let absolute = if trimmed.starts_with("//") {
        format!("https:{}", trimmed)
    } else if trimmed.starts_with('/') {
        format!("https://duckduckgo.com{}", trimmed)
    } else {
        trimmed.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let is_redirect = parsed
        .host_str()
        .is_some_and(|host| host.ends_with("duckduckgo.com"))
        && parsed.path().starts_with("/l/");
    if !is_redirect {
        return Some(parsed.to_string());
    }

    let target = parsed
        .query_pairs()
        .find(|(k, _)| k == "uddg")
        .map(|(_, v)| v.into_owned())?;
    let mut dest = Url::parse(target.trim()).ok()?;
    dest.set_fragment(None);
    Some(dest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HTML_PAGE: &str = r#"
        <html><body>
          <div class="result results_links">
            <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2Flearn%23top&amp;rut=abc">
              The Rust   Book</a></h2>
            <a class="result__snippet">Learn <b>Rust</b> ownership.</a>
          </div>
          <div class="result">
            <h2><a class="result__a" href="https://cs.stanford.edu/rust">Stanford Rust</a></h2>
            <div class="result__snippet">Course notes.</div>
          </div>
          <div class="result">
            <h2><a class="result__a" href="https://cs.stanford.edu/rust">Duplicate</a></h2>
          </div>
          <div class="result"><span>no link here</span></div>
        </body></html>
    "#;

    const LITE_PAGE: &str = r#"
        <html><body><table>
          <tr><td><a class="result-link" href="https://example.org/a">First</a></td></tr>
          <tr><td class="result-snippet">First snippet.</td></tr>
          <tr><td><a class="result-link" href="https://example.com/b">Second</a></td></tr>
          <tr><td class="result-snippet">Second snippet.</td></tr>
        </table></body></html>
    "#;

    #[test]
    fn test_normalize_redirect_href() {
        assert_eq!(
            normalize_result_href("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.edu%2Fx%23frag")
                .as_deref(),
            Some("https://example.edu/x")
        );
        assert_eq!(
            normalize_result_href("https://example.gov/page").as_deref(),
            Some("https://example.gov/page")
        );
        assert_eq!(normalize_result_href("javascript:void(0)"), None);
        assert_eq!(normalize_result_href("/l/?nothing=1"), None);
    }

    #[test]
    fn test_parse_html_results() {
        let docs = parse_html_results(HTML_PAGE, 10);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title.as_deref(), Some("The Rust Book"));
        assert_eq!(docs[0].href.as_deref(), Some("https://www.rust-lang.org/learn"));
        assert_eq!(docs[0].body.as_deref(), Some("Learn Rust ownership."));
        assert_eq!(docs[1].body.as_deref(), Some("Course notes."));
    }

    #[test]
    fn test_parse_html_respects_limit() {
        assert_eq!(parse_html_results(HTML_PAGE, 1).len(), 1);
        assert!(parse_html_results("<html></html>", 5).is_empty());
    }

    #[test]
    fn test_parse_lite_results() {
        let docs = parse_lite_results(LITE_PAGE, 10);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].title.as_deref(), Some("Second"));
        assert_eq!(docs[1].body.as_deref(), Some("Second snippet."));
    }

    #[test]
    fn test_parse_instant_answer_flattens_groups() {
        let answer: InstantAnswer = serde_json::from_value(serde_json::json!({
            "Heading": "Rust",
            "AbstractText": "Rust is a language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
            "RelatedTopics": [
                {"Text": "Cargo - Rust package manager", "FirstURL": "https://duckduckgo.com/Cargo"},
                {"Name": "Tools", "Topics": [
                    {"Text": "Clippy - Rust linter", "FirstURL": "https://duckduckgo.com/Clippy"}
                ]},
                {"Text": "", "FirstURL": "https://duckduckgo.com/empty"}
            ]
        }))
        .unwrap();

        let docs = parse_instant_answer(answer, 10);
        let titles: Vec<_> = docs.iter().filter_map(|d| d.title.as_deref()).collect();
        assert_eq!(titles, vec!["Rust", "Cargo", "Clippy"]);
        assert_eq!(docs[1].body.as_deref(), Some("Cargo - Rust package manager"));
    }

    #[test]
    fn test_parse_instant_answer_empty() {
        let docs = parse_instant_answer(InstantAnswer::default(), 7);
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_api_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("q", "rust"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Heading": "Rust",
                "AbstractText": "Rust is a language.",
                "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
                "RelatedTopics": []
            })))
            .mount(&server)
            .await;

        let provider =
            DuckDuckGoProvider::new(DuckDuckGoConfig::default().with_base_url(&server.uri()))
                .unwrap();
        let docs = provider.search("rust", 7, SearchBackend::Api).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body.as_deref(), Some("Rust is a language."));
    }

    #[tokio::test]
    async fn test_html_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(HTML_PAGE))
            .mount(&server)
            .await;

        let provider =
            DuckDuckGoProvider::new(DuckDuckGoConfig::default().with_base_url(&server.uri()))
                .unwrap();
        let docs = provider.search("rust", 7, SearchBackend::Html).await.unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lite/"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider =
            DuckDuckGoProvider::new(DuckDuckGoConfig::default().with_base_url(&server.uri()))
                .unwrap();
        let err = provider
            .search("rust", 7, SearchBackend::Lite)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let provider =
            DuckDuckGoProvider::new(DuckDuckGoConfig::default().with_base_url(&server.uri()))
                .unwrap();
        let err = provider
            .search("rust", 7, SearchBackend::Api)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
    }
}
