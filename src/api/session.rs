use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Session Router Module
///
/// Exposes the session flag. Login and logout only flip the flag; credential checks live in
/// the accounts service that calls them.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        // GET /session
        .route("/session", get(handlers::get_session))
        // POST /session/login
        // Set after the accounts service reports a successful login.
        .route("/session/login", post(handlers::login))
        // POST /session/logout
        .route("/session/logout", post(handlers::logout))
}
