//! # keyboard_relay - Smart AI Keyboard relay
//!
//! A thin HTTP relay between the Smart AI Keyboard input extension and
//! OpenRouter. It injects the API key and a system prompt, forwards exactly
//! one chat-completion call per request and hands back the model's text.
//!
//! ## Routes
//!
//! - `GET /health` - liveness plus provider, model and whether a key is set
//! - `POST /enhance` - rewrite a prompt; throttled per client IP
//! - `POST /quick-action` - apply one of seven fixed rewrites
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keyboard_relay::{create_router, AppState, Config};
//! use std::net::SocketAddr;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::parse_args();
//!     let state = AppState::new(config.clone())?;
//!     let app = create_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//!     axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - CLI/environment configuration
//! - [`client`] - OpenRouter client and the [`CompletionBackend`] seam
//! - [`actions`] - quick action templates
//! - [`rate_limiting`] - fixed-window per-client throttle
//! - [`schemas`] - request/response data structures
//! - [`error`] - error taxonomy and client-facing messages

// Core infrastructure
pub mod core;
pub mod client;
pub mod config;
pub mod error;
pub mod schemas;

// Domain modules
pub mod actions;
pub mod rate_limiting;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "server")]
pub mod graceful_shutdown;

// Re-export commonly used types for convenience
pub use actions::QuickAction;
pub use client::{CompletionBackend, OpenRouterClient};
pub use config::Config;
pub use error::{ErrorKind, ProxyError};
pub use rate_limiting::{
    FixedWindowRateLimiter, InMemoryRateLimitStore, RateLimitConfig, RateLimitDecision, RateLimitStore,
};
pub use schemas::{ChatMessage, CompletionRequest, EnhanceRequest, QuickActionRequest, Role};

#[cfg(feature = "server")]
pub use server::{create_router, AppState};

#[cfg(feature = "server")]
pub use graceful_shutdown::shutdown_signal;

/// The result type used throughout the library
pub type Result<T> = std::result::Result<T, ProxyError>;
