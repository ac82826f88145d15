use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Navigation Router Module
///
/// Endpoints the view layer calls while routing: the static route table and the guard's
/// decision for a requested location.
pub fn navigation_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /routes
        // The full route table, base URL applied to every path pattern.
        .route("/routes", get(handlers::get_routes))
        // GET /routes/{name}
        // A single route, e.g. to build the login link.
        .route("/routes/{name}", get(handlers::get_route))
        // POST /navigate
        // Runs the guard for the current session and returns where the user ends up.
        .route("/navigate", post(handlers::navigate))
}
