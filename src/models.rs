use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    guard::AccessRequirement,
    navigation::{Navigation, Navigator},
    route_table::RouteEntry,
};

// --- Route Table Schemas (consumed by the view layer) ---

/// RouteDescriptor
///
/// One route table row as the view-rendering layer sees it. `path` is the browser-facing
/// pattern, base URL included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteDescriptor {
    pub name: String,
    #[schema(example = "/files/:filePath")]
    pub path: String,
    #[schema(example = "PdfView")]
    pub view: String,
    pub access: AccessRequirement,
    pub props: bool,
}

impl RouteDescriptor {
    pub fn from_entry(entry: &RouteEntry, navigator: &Navigator) -> Self {
        let prefix = navigator.base_url().trim_end_matches('/');
        Self {
            name: entry.name.clone(),
            path: format!("{prefix}{}", entry.path),
            view: entry.view.clone(),
            access: entry.access,
            props: entry.props,
        }
    }
}

// --- Navigation Schemas ---

/// NavigateRequest
///
/// Input payload for POST /navigate.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigateRequest {
    /// Browser-facing target, base URL included. May carry a query string.
    #[schema(example = "/files?sort=name")]
    pub to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NavigationOutcome {
    Proceed,
    Redirected,
    Denied,
}

/// NavigationResponse
///
/// The resolved navigation. `location` is absent only when the navigation was denied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationResponse {
    pub outcome: NavigationOutcome,
    pub requested: String,
    pub location: Option<String>,
    pub route: Option<String>,
    pub params: BTreeMap<String, String>,
    pub reason: Option<String>,
}

impl NavigationResponse {
    pub fn from_navigation(navigation: Navigation, navigator: &Navigator) -> Self {
        match navigation {
            Navigation::Proceed {
                location,
                route,
                params,
            } => Self {
                outcome: NavigationOutcome::Proceed,
                requested: navigator.href(&location),
                location: Some(navigator.href(&location)),
                route,
                params,
                reason: None,
            },
            Navigation::Redirected {
                requested,
                location,
                route,
                reason,
            } => Self {
                outcome: NavigationOutcome::Redirected,
                requested: navigator.href(&requested),
                location: Some(navigator.href(&location)),
                route: Some(route),
                params: BTreeMap::new(),
                reason: Some(reason.to_string()),
            },
            Navigation::Denied { requested, reason } => Self {
                outcome: NavigationOutcome::Denied,
                requested: navigator.href(&requested),
                location: None,
                route: None,
                params: BTreeMap::new(),
                reason: Some(reason.to_string()),
            },
        }
    }
}

// --- Session Schemas ---

/// SessionStatus
///
/// The session flag as reported to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionStatus {
    pub authenticated: bool,
}
