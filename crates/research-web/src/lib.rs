//! # research-web
//!
//! HTTP-backed retrieval providers:
//!
//! - [`DuckDuckGoProvider`]: `SearchProvider` with `api`, `html` and `lite`
//!   backends
//! - [`WikipediaProvider`]: `EncyclopediaProvider` over the MediaWiki API,
//!   reporting disambiguation pages as `ProviderError::Ambiguous`

mod http;

pub mod duckduckgo;
pub mod wikipedia;

pub use duckduckgo::{DuckDuckGoConfig, DuckDuckGoProvider};
pub use wikipedia::{WikipediaConfig, WikipediaProvider};
