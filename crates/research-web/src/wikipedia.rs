//! Wikipedia provider over the MediaWiki Action API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use research_retrieval::{EncyclopediaPage, EncyclopediaProvider, ProviderError};
use research_types::EncyclopediaSettings;
use serde::Deserialize;
use tracing::debug;

use crate::http::{build_client, fetch_json};

const SEARCH_LIMIT: &str = "10";

#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    /// Action API endpoint, e.g. `https://en.wikipedia.org/w/api.php`
    pub api_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl WikipediaConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: Duration::from_secs(15),
            user_agent: format!("research-agent/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn from_settings(settings: &EncyclopediaSettings, user_agent: &str) -> Self {
        Self {
            api_url: settings.api_url.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            user_agent: user_agent.to_string(),
        }
    }
}

pub struct WikipediaProvider {
    client: Client,
    config: WikipediaConfig,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    query: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<PageInfo>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    title: String,
}

impl WikipediaProvider {
    pub fn new(config: WikipediaConfig) -> Result<Self, ProviderError> {
        let client = build_client(config.timeout, &config.user_agent)?;
        Ok(Self { client, config })
    }

    async fn query_pages(&self, params: &[(&str, &str)]) -> Result<Vec<PageInfo>, ProviderError> {
        let request = self
            .client
            .get(&self.config.api_url)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params);
        let response: QueryResponse<PagesQuery> = fetch_json(request).await?;
        Ok(response.query.map(|q| q.pages).unwrap_or_default())
    }

    /// Titles linked from a disambiguation page, in page order.
    async fn disambiguation_options(&self, title: &str) -> Result<Vec<String>, ProviderError> {
        let pages = self
            .query_pages(&[
                ("prop", "links"),
                ("titles", title),
                ("plnamespace", "0"),
                ("pllimit", "max"),
            ])
            .await?;
        Ok(pages
            .into_iter()
            .flat_map(|p| p.links)
            .map(|l| l.title)
            .collect())
    }
}

#[async_trait]
impl EncyclopediaProvider for WikipediaProvider {
    async fn search_titles(&self, query: &str) -> Result<Vec<String>, ProviderError> {
        let request = self.client.get(&self.config.api_url).query(&[
            ("action", "query"),
            ("format", "json"),
            ("formatversion", "2"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", SEARCH_LIMIT),
            ("srprop", ""),
        ]);
        let response: QueryResponse<SearchQuery> = fetch_json(request).await?;
        let titles: Vec<String> = response
            .query
            .map(|q| q.search.into_iter().map(|h| h.title).collect())
            .unwrap_or_default();
        debug!(query, count = titles.len(), "Wikipedia title search");
        Ok(titles)
    }

    async fn fetch_page(
        &self,
        title: &str,
        auto_suggest: bool,
    ) -> Result<EncyclopediaPage, ProviderError> {
        let resolved = if auto_suggest {
            self.search_titles(title)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::NotFound(title.to_string()))?
        } else {
            title.to_string()
        };

        let pages = self
            .query_pages(&[
                ("prop", "extracts|info|pageprops"),
                ("titles", resolved.as_str()),
                ("redirects", "1"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("inprop", "url"),
                ("ppprop", "disambiguation"),
            ])
            .await?;

        let page = pages
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("no pages in response".to_string()))?;
        if page.missing {
            return Err(ProviderError::NotFound(resolved));
        }

        let is_disambiguation = page
            .pageprops
            .as_ref()
            .is_some_and(|p| p.disambiguation.is_some());
        if is_disambiguation {
            let options = self.disambiguation_options(&page.title).await?;
            debug!(title = %page.title, options = options.len(), "Disambiguation page");
            return Err(ProviderError::Ambiguous { options });
        }

        let url = page.fullurl.unwrap_or_else(|| {
            format!(
                "https://en.wikipedia.org/wiki/{}",
                page.title.replace(' ', "_")
            )
        });
        Ok(EncyclopediaPage {
            title: page.title,
            url,
            summary: page.extract.unwrap_or_default().trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider(server: &MockServer) -> WikipediaProvider {
        WikipediaProvider::new(WikipediaConfig::new(format!("{}/w/api.php", server.uri())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_titles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "rust language"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": [
                    {"title": "Rust (programming language)"},
                    {"title": "Rust"}
                ]}
            })))
            .mount(&server)
            .await;

        let titles = provider(&server)
            .await
            .search_titles("rust language")
            .await
            .unwrap();
        assert_eq!(titles, vec!["Rust (programming language)", "Rust"]);
    }

    #[tokio::test]
    async fn test_search_titles_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"batchcomplete": true})))
            .mount(&server)
            .await;

        let titles = provider(&server).await.search_titles("zzzz").await.unwrap();
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_page_exact_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("titles", "Rust (programming language)"))
            .and(query_param("prop", "extracts|info|pageprops"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{
                    "title": "Rust (programming language)",
                    "fullurl": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
                    "extract": "Rust is a general-purpose programming language.\n"
                }]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = provider(&server)
            .await
            .fetch_page("Rust (programming language)", false)
            .await
            .unwrap();
        assert_eq!(page.title, "Rust (programming language)");
        assert_eq!(page.url, "https://en.wikipedia.org/wiki/Rust_(programming_language)");
        assert_eq!(page.summary, "Rust is a general-purpose programming language.");
    }

    #[tokio::test]
    async fn test_fetch_missing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{"title": "Nope", "missing": true}]}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .fetch_page("Nope", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(t) if t == "Nope"));
    }

    #[tokio::test]
    async fn test_disambiguation_page_is_ambiguous() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("prop", "extracts|info|pageprops"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{
                    "title": "Mercury",
                    "pageprops": {"disambiguation": ""},
                    "extract": "Mercury may refer to:"
                }]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("prop", "links"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{
                    "title": "Mercury",
                    "links": [
                        {"ns": 0, "title": "Mercury (planet)"},
                        {"ns": 0, "title": "Mercury (element)"},
                        {"ns": 0, "title": "Mercury (mythology)"}
                    ]
                }]}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .fetch_page("Mercury", false)
            .await
            .unwrap_err();
        match err {
            ProviderError::Ambiguous { options } => assert_eq!(
                options,
                vec!["Mercury (planet)", "Mercury (element)", "Mercury (mythology)"]
            ),
            other => panic!("expected Ambiguous, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auto_suggest_resolves_through_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": [{"title": "Ferris the crab"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("titles", "Ferris the crab"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{"title": "Ferris the crab", "extract": "Mascot."}]}
            })))
            .mount(&server)
            .await;

        let page = provider(&server)
            .await
            .fetch_page("ferris", true)
            .await
            .unwrap();
        assert_eq!(page.title, "Ferris the crab");
        assert_eq!(page.url, "https://en.wikipedia.org/wiki/Ferris_the_crab");
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .search_titles("rust")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 500, .. }));
    }
}
