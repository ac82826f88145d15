use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// RouteTableError
///
/// Raised while building or querying the static route table. A table that fails validation
/// never reaches the navigator, so these surface at startup or in tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("route name `{0}` is declared more than once")]
    DuplicateName(String),
    #[error("path `{0}` is declared more than once")]
    DuplicatePath(String),
    #[error("routes require authentication but no route is named `{0}`")]
    MissingLoginRoute(String),
    #[error("no route is mapped to `/`")]
    MissingRootRoute,
    #[error("redirect target `{0}` must not declare path parameters")]
    ParameterizedRedirectTarget(String),
    #[error("missing value for parameter `{param}` of `{pattern}`")]
    MissingParam { pattern: String, param: String },
}

/// SessionError
///
/// Failures of the key-value collaborator that persists the session flag.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// NavigationError
///
/// The requested target could not be interpreted as an application location.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation target `{0}` must be an absolute path")]
    NotAbsolute(String),
    #[error("navigation target `{target}` is outside the base URL `{base}`")]
    OutsideBase { target: String, base: String },
}

/// ApiError
///
/// The error type returned by HTTP handlers and extractors. Each variant maps to one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("unknown route `{0}`")]
    UnknownRoute(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Navigation(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            ApiError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
