//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    middleware as axum_middleware,
    routing::{get, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Every path is an object key, so `/` and `/{*key}` share one method table
fn object_methods() -> MethodRouter<Arc<AppState>> {
    get(handlers::get_object)
        .head(handlers::head_object)
        .options(handlers::preflight)
        .fallback(handlers::method_not_allowed)
}

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", object_methods())
        .route("/{*key}", object_methods())
        // Innermost first: the origin gate sees the request after logging and IDs
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::origin_gate_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
