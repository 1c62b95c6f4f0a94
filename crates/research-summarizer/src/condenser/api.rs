//! API-based condenser using OpenAI-compatible or Anthropic endpoints.

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::{Condenser, CondenserError, LengthBudget};

/// Configuration for the API-based condenser.
#[derive(Debug, Clone)]
pub struct ApiCondenserConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "gpt-4o-mini", "claude-3-haiku-20240307")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum attempts per condense call
    pub max_retries: u32,
}

impl ApiCondenserConfig {
    /// Create config for OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::custom("https://api.openai.com/v1", api_key, model)
    }

    /// Create config for Claude API.
    pub fn claude(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::custom("https://api.anthropic.com/v1", api_key, model)
    }

    /// Create config for any compatible endpoint.
    pub fn custom(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    fn is_anthropic(&self) -> bool {
        self.base_url.contains("anthropic")
    }
}

/// Abstractive condenser backed by a chat-completion API.
pub struct ApiCondenser {
    client: Client,
    config: ApiCondenserConfig,
}

impl ApiCondenser {
    /// Create a new API condenser.
    pub fn new(config: ApiCondenserConfig) -> Result<Self, CondenserError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CondenserError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_prompt(&self, text: &str, budget: LengthBudget) -> String {
        let target = match budget {
            LengthBudget::Tokens { max, min } => {
                format!("between {} and {} tokens long", min, max)
            }
            LengthBudget::Sentences(n) => format!("at most {} sentences long", n),
        };

        format!(
            r#"Summarize the following research material.

MATERIAL:
{text}

Guidelines:
- The summary must be {target}
- Write plain prose, no headings or bullet points
- Keep only facts stated in the material
- Reply with the summary text only"#
        )
    }

    /// Call the API with retry logic.
    async fn call_api(&self, prompt: &str, max_tokens: u32) -> Result<String, CondenserError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Calling condensation API");

            let result = if self.config.is_anthropic() {
                self.make_anthropic_request(prompt, max_tokens).await
            } else {
                self.make_openai_request(prompt, max_tokens).await
            };

            match result {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "API call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Make OpenAI-compatible API request.
    async fn make_openai_request(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, CondenserError> {
        #[derive(Serialize)]
        struct OpenAIRequest {
            model: String,
            max_tokens: u32,
            messages: Vec<OpenAIMessage>,
        }

        #[derive(Serialize)]
        struct OpenAIMessage {
            role: String,
            content: String,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<OpenAIChoice>,
        }

        #[derive(Deserialize)]
        struct OpenAIChoice {
            message: OpenAIMessageResponse,
        }

        #[derive(Deserialize)]
        struct OpenAIMessageResponse {
            content: String,
        }

        let request = OpenAIRequest {
            model: self.config.model.clone(),
            max_tokens,
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CondenserError::ApiError(e.to_string()))?;

        if response.status() == 429 {
            return Err(CondenserError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CondenserError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let response_body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| CondenserError::ParseError(e.to_string()))?;

        response_body
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| CondenserError::ParseError("No choices in response".to_string()))
    }

    /// Make Anthropic API request.
    async fn make_anthropic_request(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, CondenserError> {
        #[derive(Serialize)]
        struct AnthropicRequest {
            model: String,
            max_tokens: u32,
            messages: Vec<AnthropicMessage>,
        }

        #[derive(Serialize)]
        struct AnthropicMessage {
            role: String,
            content: String,
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<AnthropicContent>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            text: String,
        }

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/messages", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CondenserError::ApiError(e.to_string()))?;

        if response.status() == 429 {
            return Err(CondenserError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CondenserError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let response_body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| CondenserError::ParseError(e.to_string()))?;

        response_body
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| CondenserError::ParseError("No content in response".to_string()))
    }
}

#[async_trait]
impl Condenser for ApiCondenser {
    async fn condense(&self, text: &str, budget: LengthBudget) -> Result<String, CondenserError> {
        if text.trim().is_empty() {
            return Err(CondenserError::EmptyInput);
        }

        let prompt = self.build_prompt(text, budget);
        // Leave headroom so the model is not cut off mid-sentence
        let max_tokens = budget.max_tokens_hint().saturating_add(64);
        let summary = self.call_api(&prompt, max_tokens).await?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(CondenserError::ParseError("Empty summary in response".to_string()));
        }
        Ok(summary.to_string())
    }

    fn name(&self) -> &str {
        "api"
    }
}
