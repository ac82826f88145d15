use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    guard::SessionContext,
    session::{self, SessionState},
};

/// Header that overrides the stored session flag in `Env::Local`.
pub const LOCAL_OVERRIDE_HEADER: &str = "x-authentication-state";

/// Session Extractor Result
///
/// The session context resolved for one request. Handlers hand it straight to the navigator,
/// which keeps the guard free of any storage access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session(pub SessionContext);

/// Session Extractor Implementation
///
/// 1. Dependency Resolution: the session store and AppConfig from the application state.
/// 2. Local Override: in `Env::Local`, an `x-authentication-state` header (`true`/`false`)
///    replaces the stored flag so view developers can exercise both sides of the guard.
/// 3. Store Lookup: otherwise the flag is read from the session store.
///
/// Rejection: a store failure becomes a 500 through `ApiError`.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(value) = parts
                .headers
                .get(LOCAL_OVERRIDE_HEADER)
                .and_then(|value| value.to_str().ok())
            {
                tracing::debug!(value, "using local session override header");
                return Ok(Session(SessionContext {
                    authenticated: session::parse_flag(Some(value)),
                }));
            }
        }
        // Production, or no override header: the store is authoritative.

        let context = session::load_context(store.as_ref()).await?;
        Ok(Session(context))
    }
}
