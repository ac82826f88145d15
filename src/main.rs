use navguard::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    navigation::Navigator,
    route_table::RouteTable,
    session::{FileSessionStore, InMemorySessionStore, SessionState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Startup order: configuration, logging, route table, session store, HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production settings)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise debug for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "navguard=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Navigation service starting in {:?} mode", config.env);

    // 3. Route table
    let table = RouteTable::application().expect("FATAL: application route table is invalid");
    let navigator = Navigator::new(table, &config.base_url);
    tracing::info!(
        routes = navigator.table().len(),
        base_url = navigator.base_url(),
        "route table loaded"
    );

    // 4. Session store
    let sessions: SessionState = match &config.session_store_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using file session store");
            Arc::new(FileSessionStore::new(path.clone()))
        }
        None => {
            tracing::warn!("SESSION_STORE_PATH not set, session flag will not survive restarts");
            Arc::new(InMemorySessionStore::new())
        }
    };

    // 5. Router and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(navigator, sessions, config));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind BIND_ADDR");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated");
}
