use std::{env, path::PathBuf};

/// AppConfig
///
/// Holds the service configuration. Immutable once loaded and pulled into handlers through
/// `FromRef` like the rest of the unified state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and the local session override header.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // History-mode base URL every application path lives under. Always starts and ends with `/`.
    pub base_url: String,
    // JSON file backing the session store. `None` selects the in-memory store (local only).
    pub session_store_path: Option<PathBuf>,
}

/// Env
///
/// Defines the runtime context: developer conveniences in `Local`, hardened defaults in
/// `Production`.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            base_url: "/".to_string(),
            session_store_path: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics in production when `SESSION_STORE_PATH` is not set: a production deployment must
    /// not silently fall back to a session store that forgets everything on restart.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let base_url =
            normalize_base_url(&env::var("BASE_URL").unwrap_or_else(|_| "/".to_string()));

        let session_store_path = match env {
            Env::Production => Some(PathBuf::from(
                env::var("SESSION_STORE_PATH")
                    .expect("FATAL: SESSION_STORE_PATH must be set in production."),
            )),
            Env::Local => env::var("SESSION_STORE_PATH").ok().map(PathBuf::from),
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| match env {
            Env::Production => "0.0.0.0:3000".to_string(),
            Env::Local => "127.0.0.1:3000".to_string(),
        });

        Self {
            env,
            bind_addr,
            base_url,
            session_store_path,
        }
    }
}

/// normalize_base_url
///
/// `app`, `/app` and `/app/` all become `/app/`; an empty value becomes `/`.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
