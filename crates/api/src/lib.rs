//! HTTP API layer for murmur.
//!
//! - **Endpoints**: JSON routes under `/api`
//! - **Extractors**: the authenticated [`murmur_core::Actor`]
//! - **Middleware**: bearer token verification
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Largest request body accepted, in bytes.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// The complete application: `/api` routes wrapped in the tower-http layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router(state.clone()))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
