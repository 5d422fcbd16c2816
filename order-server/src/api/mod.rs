//! API routing module
//!
//! # Structure
//!
//! - [`health`] - health checks (liveness + per-component)
//! - [`orders`] - order creation, lookup, per-user listing

pub mod health;
pub mod orders;

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::{Router, middleware};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::core::ServerState;
use shared::{AppError, ErrorCode};

/// HTTP request logging middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Map timeout-layer failures onto the unified error envelope
async fn handle_timeout(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::new(ErrorCode::TimeoutError)
    } else {
        AppError::internal(err.to_string())
    }
}

/// Build the application router with middleware applied
///
/// Every request gets an `x-request-id` (generated if the client did not
/// send one) which is propagated to the response and threaded through the
/// write path for log correlation. Requests running past
/// `request_timeout_ms` are cut off with a 504 envelope.
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    let api = Router::<ServerState>::new()
        .merge(orders::router())
        .merge(health::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
