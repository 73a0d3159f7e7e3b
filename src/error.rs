//! # Error Handling
//!
//! Every failure a request can hit is folded into [`ProxyError`]. The HTTP
//! response only ever carries a fixed client message; upstream bodies, reqwest
//! errors and parse failures stay in the server log.

#[cfg(feature = "server")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
#[cfg(feature = "server")]
use serde_json::json;
use thiserror::Error;

pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid API key";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to process request";
pub const INTERNAL_MESSAGE: &str = "Something went wrong!";
pub const MISSING_API_KEY_MESSAGE: &str = "OpenRouter API key not configured";

/// Coarse error category, one per client-facing status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Config,
    RateLimited,
    Unauthorized,
    UpstreamFailure,
    Internal,
}

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing or invalid client-supplied field. The message is shown to the client.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Server-side configuration is incomplete. The message is shown to the client.
    #[error("configuration error: {0}")]
    Config(String),
    /// Local throttle or upstream 429.
    #[error("rate limit exceeded")]
    RateLimited,
    /// Upstream rejected the credential.
    #[error("upstream rejected API key")]
    Unauthorized,
    /// Any other upstream, network or decoding failure.
    #[error("upstream failure: {0}")]
    Upstream(String),
    /// Uncaught failure at the server boundary.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxyError::Validation(_) => ErrorKind::Validation,
            ProxyError::Config(_) => ErrorKind::Config,
            ProxyError::RateLimited => ErrorKind::RateLimited,
            ProxyError::Unauthorized => ErrorKind::Unauthorized,
            ProxyError::Upstream(_) => ErrorKind::UpstreamFailure,
            ProxyError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Error raised when the upstream credential is absent.
    pub fn missing_api_key() -> Self {
        ProxyError::Config(MISSING_API_KEY_MESSAGE.to_string())
    }

    /// Message safe to hand back to the caller.
    pub fn client_message(&self) -> &str {
        match self {
            ProxyError::Validation(msg) | ProxyError::Config(msg) => msg.as_str(),
            ProxyError::RateLimited => RATE_LIMITED_MESSAGE,
            ProxyError::Unauthorized => UNAUTHORIZED_MESSAGE,
            ProxyError::Upstream(_) => UPSTREAM_FAILURE_MESSAGE,
            ProxyError::Internal(_) => INTERNAL_MESSAGE,
        }
    }

    /// Collapse every non-validation failure into `Upstream`, keeping the
    /// original as detail. Used where the caller only distinguishes
    /// "bad input" from "failed".
    pub fn into_upstream_failure(self) -> Self {
        match self {
            ProxyError::Validation(_) | ProxyError::Upstream(_) => self,
            other => ProxyError::Upstream(other.to_string()),
        }
    }

    #[cfg(feature = "server")]
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::UpstreamFailure => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(feature = "server")]
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.client_message() }));
        (status, body).into_response()
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::Upstream(format!("request timeout: {}", err))
        } else if err.is_connect() {
            ProxyError::Upstream(format!("connection failed: {}", err))
        } else if err.is_decode() {
            ProxyError::Upstream(format!("malformed response body: {}", err))
        } else {
            ProxyError::Upstream(format!("HTTP client error: {}", err))
        }
    }
}

impl From<serde_json::Error> for ProxyError {
    /// Request bodies that are not valid JSON land in the catch-all.
    fn from(err: serde_json::Error) -> Self {
        ProxyError::Internal(format!("JSON error: {}", err))
    }
}
