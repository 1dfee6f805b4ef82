//! Router assembly.
//!
//! The binary and the end-to-end tests build the application the same way;
//! only the session store differs.

use std::time::Duration;

use axum::{Router, middleware, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::middleware::{
    InvalidRateLimit, auth_rate_limiter, create_session_layer, request_id_middleware,
    security_headers_middleware,
};
use crate::routes;
use crate::state::AppState;

/// Build the full application router over `store`.
///
/// # Errors
///
/// Returns `InvalidRateLimit` if the configured auth rate limit is rejected.
pub fn build_router<S>(state: AppState, store: S) -> Result<Router, InvalidRateLimit>
where
    S: SessionStore + Clone,
{
    let limiter = auth_rate_limiter(&state.config().rate_limit)?;
    let session_layer = create_session_layer(store, state.config());
    let static_dir = ServeDir::new(&state.config().static_dir);

    let app = Router::new()
        .route("/health", get(health))
        .merge(routes::routes(limiter))
        .nest_service("/static", static_dir)
        .layer(session_layer)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    Ok(app)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the API.
async fn health() -> &'static str {
    "ok"
}
