//! # Rate Limiting Module
//!
//! Fixed-window request counting keyed by client address.
//!
//! Each client identifier owns a `(window_start, count)` pair. When a request
//! arrives after the window has elapsed the pair is reset, then the count is
//! incremented; the request is denied once the count passes the limit.
//! Denied requests still count. Bursts of up to twice the limit are possible
//! across a window boundary.
//!
//! Counters live in a [`RateLimitStore`] handed to the limiter, so tests can
//! drive it with synthetic instants instead of a live clock.

use crate::config::Config;
use dashmap::DashMap;
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

/// Per-identifier window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub window_start: Instant,
    pub count: u32,
}

/// Storage for per-identifier counters.
///
/// `hit` must perform its read-modify-write atomically for a given key.
/// Distinct keys must not block each other on a shared lock.
pub trait RateLimitStore: Send + Sync {
    /// Record one request for `key` at `now` and return the state after it.
    fn hit(&self, key: &str, now: Instant, window: Duration) -> WindowState;

    /// Number of identifiers currently tracked.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store. Entries are never evicted; they are reset in place
/// when their window expires.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    entries: DashMap<String, WindowState>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn hit(&self, key: &str, now: Instant, window: Duration) -> WindowState {
        // The entry guard holds the shard lock for the whole update.
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(WindowState { window_start: now, count: 0 });

        if now.saturating_duration_since(entry.window_start) >= window {
            entry.window_start = now;
            entry.count = 0;
        }
        entry.count = entry.count.saturating_add(1);

        *entry
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// # Rate Limiting Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Length of one counting window
    pub window: Duration,
    /// Requests allowed per identifier per window
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 30,
        }
    }
}

impl From<&Config> for RateLimitConfig {
    fn from(config: &Config) -> Self {
        Self {
            window: config.rate_limit_window(),
            max_requests: config.rate_limit_max_requests,
        }
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests counted in the current window, this one included
    pub count: u32,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window ends
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Whole seconds until reset, rounded up, for `Retry-After`.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// # Fixed Window Rate Limiter
pub struct FixedWindowRateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
}

impl fmt::Debug for FixedWindowRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedWindowRateLimiter")
            .field("config", &self.config)
            .field("tracked_clients", &self.store.len())
            .finish()
    }
}

impl FixedWindowRateLimiter {
    pub fn new(config: RateLimitConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self { config, store }
    }

    /// Limiter backed by a fresh [`InMemoryRateLimitStore`].
    pub fn in_memory(config: RateLimitConfig) -> Self {
        Self::new(config, Arc::new(InMemoryRateLimitStore::new()))
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }

    /// Check `key` against the current time.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Check `key` as if the request arrived at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let state = self.store.hit(key, now, self.config.window);
        let limit = self.config.max_requests;
        let elapsed = now.saturating_duration_since(state.window_start);

        let decision = RateLimitDecision {
            allowed: state.count <= limit,
            count: state.count,
            limit,
            remaining: limit.saturating_sub(state.count),
            reset_after: self.config.window.saturating_sub(elapsed),
        };

        if decision.allowed {
            debug!(client = key, count = decision.count, limit, "Rate limit check passed");
        } else {
            warn!(client = key, count = decision.count, limit, "Rate limit exceeded");
        }

        decision
    }
}

#[cfg(feature = "server")]
pub use middleware::rate_limit_middleware;

#[cfg(feature = "server")]
mod middleware {
    use super::{FixedWindowRateLimiter, RateLimitDecision};
    use crate::error::ProxyError;
    use axum::{
        extract::{ConnectInfo, Request, State},
        http::{HeaderMap, HeaderValue},
        middleware::Next,
        response::{IntoResponse, Response},
    };
    use std::{net::SocketAddr, sync::Arc};

    pub const UNKNOWN_CLIENT: &str = "unknown";

    /// Client identifier for a request: the peer IP, or `unknown` when the
    /// server was not started with connection info.
    pub fn client_key(req: &Request) -> String {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
    }

    fn set_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
        headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
        if !decision.allowed {
            headers.insert("retry-after", HeaderValue::from(decision.retry_after_secs()));
        }
    }

    /// Axum middleware; attach with `middleware::from_fn_with_state`.
    pub async fn rate_limit_middleware(
        State(limiter): State<Arc<FixedWindowRateLimiter>>,
        req: Request,
        next: Next,
    ) -> Response {
        let key = client_key(&req);
        let decision = limiter.check(&key);

        let mut response = if decision.allowed {
            next.run(req).await
        } else {
            ProxyError::RateLimited.into_response()
        };

        set_headers(response.headers_mut(), &decision);
        response
    }
}
