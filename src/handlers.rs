use crate::{
    NavigatorState,
    auth::Session,
    error::ApiError,
    models::{NavigateRequest, NavigationResponse, RouteDescriptor, SessionStatus},
    session::{self, SessionState},
};
use axum::{
    Json,
    extract::{Path, State},
};

// --- Route Table ---

/// get_routes
///
/// Lists the route table in declaration order.
#[utoipa::path(
    get,
    path = "/routes",
    responses((status = 200, description = "Route table", body = [RouteDescriptor]))
)]
pub async fn get_routes(State(navigator): State<NavigatorState>) -> Json<Vec<RouteDescriptor>> {
    let routes = navigator
        .table()
        .iter()
        .map(|entry| RouteDescriptor::from_entry(entry, &navigator))
        .collect();
    Json(routes)
}

/// get_route
///
/// Looks a single route up by name.
#[utoipa::path(
    get,
    path = "/routes/{name}",
    params(("name" = String, Path, description = "Route name")),
    responses(
        (status = 200, description = "Found", body = RouteDescriptor),
        (status = 404, description = "Unknown route")
    )
)]
pub async fn get_route(
    State(navigator): State<NavigatorState>,
    Path(name): Path<String>,
) -> Result<Json<RouteDescriptor>, ApiError> {
    navigator
        .table()
        .by_name(&name)
        .map(|entry| Json(RouteDescriptor::from_entry(entry, &navigator)))
        .ok_or(ApiError::UnknownRoute(name))
}

// --- Navigation ---

/// navigate
///
/// Resolves a navigation attempt for the current session: the requested location, a redirect
/// chosen by the guard, or a denial.
///
/// *Note*: The session context is resolved by the `Session` extractor before this runs.
#[utoipa::path(
    post,
    path = "/navigate",
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Resolved navigation", body = NavigationResponse),
        (status = 400, description = "Target is not an application path")
    )
)]
pub async fn navigate(
    Session(context): Session,
    State(navigator): State<NavigatorState>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<NavigationResponse>, ApiError> {
    let navigation = navigator.navigate(&payload.to, &context)?;
    Ok(Json(NavigationResponse::from_navigation(navigation, &navigator)))
}

// --- Session Flag ---

/// get_session
///
/// Reports whether the current session is authenticated.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Session status", body = SessionStatus))
)]
pub async fn get_session(Session(context): Session) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: context.authenticated,
    })
}

/// login
///
/// Sets the session flag. Called by the view layer once the accounts service has accepted the
/// user's credentials; no credentials are checked here.
#[utoipa::path(
    post,
    path = "/session/login",
    responses((status = 200, description = "Session authenticated", body = SessionStatus))
)]
pub async fn login(State(sessions): State<SessionState>) -> Result<Json<SessionStatus>, ApiError> {
    session::mark_authenticated(sessions.as_ref()).await?;
    Ok(Json(SessionStatus {
        authenticated: true,
    }))
}

/// logout
///
/// Clears the session flag.
#[utoipa::path(
    post,
    path = "/session/logout",
    responses((status = 200, description = "Session cleared", body = SessionStatus))
)]
pub async fn logout(
    State(sessions): State<SessionState>,
) -> Result<Json<SessionStatus>, ApiError> {
    session::clear(sessions.as_ref()).await?;
    Ok(Json(SessionStatus {
        authenticated: false,
    }))
}
