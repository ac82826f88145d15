use axum::{Router, extract::FromRef, http::HeaderName};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Routing core: the guard, the static route table and the navigator that combines them.
pub mod guard;
pub mod navigation;
pub mod route_table;

// Service components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod session;

// HTTP endpoint groups.
pub mod api;
use api::{navigation as navigation_api, session as session_api};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use guard::{AccessRequirement, GuardDecision, SessionContext};
pub use navigation::{Navigation, Navigator};
pub use route_table::RouteTable;
pub use session::{FileSessionStore, InMemorySessionStore, SessionState, SessionStore};

/// ApiDoc
///
/// Aggregates the `#[utoipa::path]` handlers and schemas into the OpenAPI document served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_routes, handlers::get_route, handlers::navigate,
        handlers::get_session, handlers::login, handlers::logout,
    ),
    components(
        schemas(
            models::RouteDescriptor, models::NavigateRequest, models::NavigationResponse,
            models::NavigationOutcome, models::SessionStatus, guard::AccessRequirement,
        )
    ),
    tags(
        (name = "navguard", description = "Route table and navigation guard API")
    )
)]
struct ApiDoc;

/// NavigatorState
///
/// The navigator is immutable after startup and shared by reference count.
pub type NavigatorState = Arc<Navigator>;

/// AppState
///
/// The single state container shared by every request: the navigator (route table + guard),
/// the session store, and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub navigator: NavigatorState,
    pub sessions: SessionState,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(navigator: Navigator, sessions: SessionState, config: AppConfig) -> Self {
        Self {
            navigator: Arc::new(navigator),
            sessions,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for NavigatorState {
    fn from_ref(app_state: &AppState) -> NavigatorState {
        app_state.navigator.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the endpoint groups, the docs UI, and the observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(navigation_api::navigation_routes())
        .merge(session_api::session_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: every log line of a request carries its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
