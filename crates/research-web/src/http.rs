//! Shared HTTP plumbing for the web providers.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use research_retrieval::ProviderError;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Build a client with the given timeout and User-Agent.
pub(crate) fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ProviderError::Transport(e.to_string()))
}

/// Send a request and return the body, mapping HTTP failures.
pub(crate) async fn fetch_text(request: RequestBuilder) -> Result<String, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "Provider response");

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            message: message.chars().take(200).collect(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))
}

/// Send a request and decode a JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let body = fetch_text(request).await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Collapse runs of whitespace to single spaces.
pub(crate) fn compact_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
