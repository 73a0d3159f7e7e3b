//! # OpenRouter Client
//!
//! One blocking-from-the-caller's-view POST to the provider's
//! chat-completion endpoint per call. No retries, no caching.

use crate::{
    config::Config,
    core::http_client::{HttpClientBuilder, HttpClientError},
    error::ProxyError,
    schemas::{ChatCompletionRequest, ChatCompletionResponse, CompletionRequest},
};
use reqwest::{header, Client, StatusCode};
use std::time::Instant;
use tracing::{debug, error};

pub const PROVIDER_NAME: &str = "OpenRouter";

/// Something that can turn a two-message conversation into text.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Provider name reported by `/health`.
    fn provider(&self) -> &str;

    /// Model identifier sent upstream.
    fn model(&self) -> &str;

    /// Issue exactly one upstream call and return the trimmed reply.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProxyError>;
}

#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    referer: String,
    app_name: String,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl OpenRouterClient {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key().map(str::to_owned),
            referer: config.site_url.clone(),
            app_name: config.app_name.clone(),
        }
    }

    /// Build a client with its own pooled transport.
    pub fn from_config(config: &Config) -> Result<Self, HttpClientError> {
        let client = HttpClientBuilder::from_config(config).build()?;
        Ok(Self::new(config, client))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn map_status(status: StatusCode, body: &str) -> ProxyError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => ProxyError::RateLimited,
            StatusCode::UNAUTHORIZED => ProxyError::Unauthorized,
            _ => ProxyError::Upstream(format!("HTTP {}: {}", status.as_u16(), body)),
        }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for OpenRouterClient {
    fn provider(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProxyError> {
        let api_key = self.api_key.as_deref().ok_or_else(ProxyError::missing_api_key)?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            max_tokens: &request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            model = %self.model,
            max_tokens = %request.max_tokens,
            temperature = request.temperature,
            "Sending chat completion request"
        );
        let start_time = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.app_name)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("OpenRouter request failed: {}", e);
                ProxyError::from(e)
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            error!("Failed to read OpenRouter response body: {}", e);
            ProxyError::from(e)
        })?;

        debug!(
            status = status.as_u16(),
            response_time_ms = start_time.elapsed().as_millis() as u64,
            "Completed chat completion request"
        );

        if !status.is_success() {
            let error_text = String::from_utf8_lossy(&bytes);
            error!(status = status.as_u16(), "OpenRouter error response: {}", error_text);
            return Err(Self::map_status(status, &error_text));
        }

        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|e| {
            error!("Failed to decode OpenRouter response: {}", e);
            ProxyError::Upstream(format!(
                "error decoding response body: {} (body: {})",
                e,
                String::from_utf8_lossy(&bytes)
            ))
        })?;

        parsed.first_text().ok_or_else(|| {
            error!("OpenRouter response has no message content");
            ProxyError::Upstream("response contained no choices[0].message.content".to_string())
        })
    }
}
