//! # Server Handlers
//!
//! `/health`, `/enhance` and `/quick-action`. Each handler validates before
//! touching the backend and issues at most one upstream call.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

use super::AppState;
use crate::{
    actions::{QuickAction, INVALID_ACTION_MESSAGE},
    error::ProxyError,
    schemas::{
        CompletionRequest, EnhanceRequest, HealthResponse, QuickActionRequest, TextResponse,
        DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, ENHANCE_SYSTEM_PROMPT, QUICK_ACTION_SYSTEM_PROMPT,
    },
};

pub const PROMPT_REQUIRED_MESSAGE: &str = "Prompt is required";
pub const TEXT_AND_ACTION_REQUIRED_MESSAGE: &str = "Text and action are required";

/// JSON body extractor.
///
/// An empty body decodes as `T::default()` so missing fields surface as
/// validation errors. Bodies that are not valid JSON for `T` are rejected
/// through the catch-all.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = ProxyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            error!("Failed to read request body: {}", e);
            ProxyError::Internal(format!("failed to read request body: {}", e))
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            warn!("Rejected malformed request body: {}", e);
            ProxyError::from(e)
        })
    }
}

/// Run the upstream call on its own task so it finishes even if the client
/// disconnects and the handler future is dropped.
async fn complete_detached(
    state: &AppState,
    request: CompletionRequest,
) -> Result<String, ProxyError> {
    let backend = Arc::clone(&state.backend);
    tokio::spawn(async move { backend.complete(request).await })
        .await
        .map_err(|e| ProxyError::Internal(format!("upstream task failed: {}", e)))?
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        provider: state.backend().provider().to_string(),
        model: state.config().model.clone(),
        has_api_key: state.config().has_api_key(),
    };

    (StatusCode::OK, Json(health))
}

/// Rewrite free text with the general-purpose system prompt.
pub async fn enhance(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<EnhanceRequest>,
) -> Result<Json<TextResponse>, ProxyError> {
    let prompt = req
        .prompt()
        .ok_or_else(|| ProxyError::Validation(PROMPT_REQUIRED_MESSAGE.to_string()))?;

    if !state.config().has_api_key() {
        error!("Rejecting /enhance: OPENROUTER_API_KEY is not configured");
        return Err(ProxyError::missing_api_key());
    }

    let request = CompletionRequest::new(
        ENHANCE_SYSTEM_PROMPT,
        prompt,
        req.max_tokens(),
        req.temperature(),
    );

    let text = complete_detached(&state, request).await.map_err(|e| {
        error!("Error processing request: {}", e);
        e
    })?;

    Ok(Json(TextResponse { text }))
}

/// Apply one of the fixed quick actions to `text`.
///
/// The credential is not pre-checked here, and every upstream failure,
/// including 401 and 429, is reported as a plain 500.
pub async fn quick_action(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<QuickActionRequest>,
) -> Result<Json<TextResponse>, ProxyError> {
    let (text, action) = match (req.text(), req.action()) {
        (Some(text), Some(action)) => (text, action),
        _ => {
            return Err(ProxyError::Validation(
                TEXT_AND_ACTION_REQUIRED_MESSAGE.to_string(),
            ))
        }
    };

    let action: QuickAction = match action {
        Value::String(name) => name.parse()?,
        _ => return Err(ProxyError::Validation(INVALID_ACTION_MESSAGE.to_string())),
    };

    let request = CompletionRequest::new(
        QUICK_ACTION_SYSTEM_PROMPT,
        action.render(&text),
        DEFAULT_MAX_TOKENS,
        DEFAULT_TEMPERATURE,
    );

    let text = complete_detached(&state, request).await.map_err(|e| {
        error!(action = %action, "Error processing quick action: {}", e);
        e.into_upstream_failure()
    })?;

    Ok(Json(TextResponse { text }))
}
