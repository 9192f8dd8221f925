//! Pantry server library.
//!
//! Pantry CRUD plus AI recipe suggestions. Exposed as a library so the
//! router can be driven in-process by tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::Router;
use axum::http::{Request, Response};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{api_rate_limiter, recipe_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Build the application router without rate limiting.
pub fn app(state: AppState) -> Router {
    build_router(state, false)
}

/// Build the application router with per-IP rate limits on pantry and recipe routes.
///
/// Requires the server to be started with `into_make_service_with_connect_info`
/// when no proxy header carries the client IP.
pub fn app_with_rate_limits(state: AppState) -> Router {
    build_router(state, true)
}

fn build_router(state: AppState, rate_limited: bool) -> Router {
    let mut pantry = routes::pantry_routes();
    let mut recipes = routes::recipe_routes();
    if rate_limited {
        pantry = pantry.layer(api_rate_limiter());
        recipes = recipes.layer(recipe_rate_limiter());
    }

    Router::new()
        .merge(routes::health_routes())
        .merge(pantry)
        .merge(recipes)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    #[allow(clippy::cast_possible_truncation)] // Request latency fits in u64 millis
                    let latency_ms = latency.as_millis() as u64;
                    span.record("latency_ms", latency_ms);
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}
