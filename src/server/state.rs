//! # Application State
//!
//! Shared state handed to every handler: configuration, the upstream
//! backend and the rate limiter that owns the per-client counters.

use crate::{
    client::{CompletionBackend, OpenRouterClient},
    config::Config,
    core::http_client::HttpClientError,
    rate_limiting::{FixedWindowRateLimiter, RateLimitConfig, RateLimitStore},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Upstream completion backend
    pub backend: Arc<dyn CompletionBackend>,
    /// Fixed-window limiter for `/enhance`
    pub rate_limiter: Arc<FixedWindowRateLimiter>,
}

impl AppState {
    /// State wired to OpenRouter with an in-memory rate limit store.
    pub fn new(config: Config) -> Result<Self, HttpClientError> {
        let backend = OpenRouterClient::from_config(&config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// State with a caller-supplied backend.
    pub fn with_backend(config: Config, backend: Arc<dyn CompletionBackend>) -> Self {
        let rate_limiter = FixedWindowRateLimiter::in_memory(RateLimitConfig::from(&config));
        Self {
            config: Arc::new(config),
            backend,
            rate_limiter: Arc::new(rate_limiter),
        }
    }

    /// State with a caller-supplied backend and rate limit store.
    pub fn with_parts(
        config: Config,
        backend: Arc<dyn CompletionBackend>,
        store: Arc<dyn RateLimitStore>,
    ) -> Self {
        let rate_limiter = FixedWindowRateLimiter::new(RateLimitConfig::from(&config), store);
        Self {
            config: Arc::new(config),
            backend,
            rate_limiter: Arc::new(rate_limiter),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &dyn CompletionBackend {
        self.backend.as_ref()
    }

    pub fn rate_limiter(&self) -> &Arc<FixedWindowRateLimiter> {
        &self.rate_limiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_state_creation() {
        let state = AppState::new(Config::for_test()).unwrap();

        assert_eq!(state.backend().provider(), "OpenRouter");
        assert_eq!(state.backend().model(), "openai/gpt-4o-mini");
        assert_eq!(state.rate_limiter().config().max_requests, 30);
        assert_eq!(state.rate_limiter().tracked_clients(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_follows_config() {
        let mut config = Config::for_test();
        config.rate_limit_max_requests = 5;
        config.rate_limit_window_secs = 10;

        let state = AppState::new(config).unwrap();
        let limits = state.rate_limiter().config();
        assert_eq!(limits.max_requests, 5);
        assert_eq!(limits.window, std::time::Duration::from_secs(10));
    }
}
