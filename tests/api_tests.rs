use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use navguard::{
    AppConfig, AppState, InMemorySessionStore, Navigator, RouteTable, create_router,
    config::Env,
    models::{NavigationOutcome, NavigationResponse, RouteDescriptor, SessionStatus},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::util::ServiceExt;

// --- Helpers ---

fn app_with(store: InMemorySessionStore, env: Env, base_url: &str) -> Router {
    let config = AppConfig {
        env,
        base_url: base_url.to_string(),
        ..AppConfig::default()
    };
    let navigator = Navigator::new(RouteTable::application().unwrap(), base_url);
    create_router(AppState::new(navigator, Arc::new(store), config))
}

fn app(store: InMemorySessionStore) -> Router {
    app_with(store, Env::Production, "/")
}

fn navigate_request(to: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/navigate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "to": to }).to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let response = app(InMemorySessionStore::new())
        .oneshot(get("/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_route_table_listing() {
    let response = app(InMemorySessionStore::new())
        .oneshot(get("/routes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let routes: Vec<RouteDescriptor> = json_body(response).await;
    assert_eq!(routes.len(), 5);
    assert_eq!(routes[2].path, "/files/:filePath");
    assert!(routes[2].props);
}

#[tokio::test]
async fn test_single_route_lookup() {
    let router = app_with(InMemorySessionStore::new(), Env::Production, "/portal/");

    let response = router.clone().oneshot(get("/routes/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login: RouteDescriptor = json_body(response).await;
    assert_eq!(login.path, "/portal/login");
    assert_eq!(login.view, "LoginView");

    let missing = router.oneshot(get("/routes/admin")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_navigate_anonymous_to_files_redirects_to_login() {
    let response = app(InMemorySessionStore::new())
        .oneshot(navigate_request("/files"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: NavigationResponse = json_body(response).await;
    assert_eq!(body.outcome, NavigationOutcome::Redirected);
    assert_eq!(body.requested, "/files");
    assert_eq!(body.location.as_deref(), Some("/login"));
    assert_eq!(body.route.as_deref(), Some("login"));
}

#[tokio::test]
async fn test_navigate_authenticated_to_login_redirects_home() {
    let response = app(InMemorySessionStore::with_flag("true"))
        .oneshot(navigate_request("/login"))
        .await
        .unwrap();

    let body: NavigationResponse = json_body(response).await;
    assert_eq!(body.outcome, NavigationOutcome::Redirected);
    assert_eq!(body.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_navigate_authenticated_to_pdf_proceeds_with_params() {
    let response = app(InMemorySessionStore::with_flag("true"))
        .oneshot(navigate_request("/files/notes.pdf"))
        .await
        .unwrap();

    let body: NavigationResponse = json_body(response).await;
    assert_eq!(body.outcome, NavigationOutcome::Proceed);
    assert_eq!(body.location.as_deref(), Some("/files/notes.pdf"));
    assert_eq!(body.route.as_deref(), Some("pdf-explorer"));
    assert_eq!(body.params.get("filePath").map(String::as_str), Some("notes.pdf"));
}

#[tokio::test]
async fn test_navigate_rejects_relative_target() {
    let response = app(InMemorySessionStore::new())
        .oneshot(navigate_request("files"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_then_logout_changes_navigation() {
    let router = app(InMemorySessionStore::new());

    let response = router.clone().oneshot(post("/session/login")).await.unwrap();
    let status: SessionStatus = json_body(response).await;
    assert!(status.authenticated);

    let response = router.clone().oneshot(navigate_request("/files")).await.unwrap();
    let body: NavigationResponse = json_body(response).await;
    assert_eq!(body.outcome, NavigationOutcome::Proceed);

    let response = router.clone().oneshot(post("/session/logout")).await.unwrap();
    let status: SessionStatus = json_body(response).await;
    assert!(!status.authenticated);

    let response = router.oneshot(get("/session")).await.unwrap();
    let status: SessionStatus = json_body(response).await;
    assert!(!status.authenticated);
}

#[tokio::test]
async fn test_local_override_header() {
    let mut request = navigate_request("/files");
    request.headers_mut().insert(
        "x-authentication-state",
        header::HeaderValue::from_static("true"),
    );

    let response = app_with(InMemorySessionStore::new(), Env::Local, "/")
        .oneshot(request)
        .await
        .unwrap();
    let body: NavigationResponse = json_body(response).await;
    assert_eq!(body.outcome, NavigationOutcome::Proceed);
}

#[tokio::test]
async fn test_local_override_ignored_in_production() {
    let mut request = navigate_request("/files");
    request.headers_mut().insert(
        "x-authentication-state",
        header::HeaderValue::from_static("true"),
    );

    let response = app(InMemorySessionStore::new())
        .oneshot(request)
        .await
        .unwrap();
    let body: NavigationResponse = json_body(response).await;
    assert_eq!(body.outcome, NavigationOutcome::Redirected);
    assert_eq!(body.location.as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = app(InMemorySessionStore::new())
        .oneshot(get("/api-docs/openapi.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc: serde_json::Value = json_body(response).await;
    assert!(doc["paths"].get("/navigate").is_some());
}
