//! # Server Module
//!
//! Router construction and middleware for the relay's HTTP surface.

pub mod handlers;
pub mod state;

pub use handlers::{enhance, health_check, quick_action};
pub use state::AppState;

use crate::{error::ProxyError, rate_limiting::rate_limit_middleware};
use axum::{
    http::{header, HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::{self, TraceLayer},
};
use tracing::{error, Level};

/// Turn a handler panic into the generic 500 body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!("Unhandled panic while processing request: {}", detail);
    ProxyError::Internal(detail).into_response()
}

/// Create router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Only /enhance is throttled.
    let enhance_route = post(enhance).route_layer(middleware::from_fn_with_state(
        state.rate_limiter().clone(),
        rate_limit_middleware,
    ));

    Router::new()
        .route("/health", get(health_check))
        .route("/enhance", enhance_route)
        .route("/quick-action", post(quick_action))
        .layer(
            ServiceBuilder::new()
                // Security headers
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_DNS_PREFETCH_CONTROL,
                    HeaderValue::from_static("off"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::STRICT_TRANSPORT_SECURITY,
                    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
                ))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(trace::DefaultOnResponse::new().level(Level::INFO)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_panic_payload_becomes_internal_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        let err = ProxyError::Internal("boom".to_string());
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.client_message(), "Something went wrong!");
    }
}
