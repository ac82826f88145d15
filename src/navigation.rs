use std::fmt;

use crate::{
    error::NavigationError,
    guard::{self, AccessRequirement, GuardDecision, SessionContext},
    route_table::{RouteEntry, RouteParams, RouteTable},
};

/// Location
///
/// An application path plus the query string that came with it. `path` never contains the
/// history base URL; `Navigator::href` adds it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{}", self.path, query),
            None => f.write_str(&self.path),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    AuthenticationRequired,
    GuestOnly,
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RedirectReason::AuthenticationRequired => "authentication required",
            RedirectReason::GuestOnly => "only available to guests",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The guard asked for the login route but the table has none. Tables built through
    /// `RouteTableBuilder` always carry one when any route requires authentication.
    NoLoginRoute,
    /// Redirects kept bouncing between guarded routes.
    RedirectLoop(Vec<String>),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NoLoginRoute => f.write_str("no login route to redirect to"),
            DenyReason::RedirectLoop(chain) => write!(f, "redirect loop: {}", chain.join(" -> ")),
        }
    }
}

/// Navigation
///
/// The fully resolved outcome of one navigation attempt. Locations are relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The requested location is shown unchanged. `route` is `None` for paths no entry matches.
    Proceed {
        location: Location,
        route: Option<String>,
        params: RouteParams,
    },
    /// The guard sent the user elsewhere. `reason` is the first redirect's reason.
    Redirected {
        requested: Location,
        location: Location,
        route: String,
        reason: RedirectReason,
    },
    Denied {
        requested: Location,
        reason: DenyReason,
    },
}

impl Navigation {
    /// The location the view layer ends up on, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Navigation::Proceed { location, .. } | Navigation::Redirected { location, .. } => {
                Some(location)
            }
            Navigation::Denied { .. } => None,
        }
    }
}

/// Navigator
///
/// Resolves requested locations under a history-mode base URL: strips the base, matches the
/// route table, runs the guard and follows its redirects until a route lets the user in.
#[derive(Debug, Clone)]
pub struct Navigator {
    table: RouteTable,
    base_url: String,
}

impl Navigator {
    /// `base_url` is normalized with `config::normalize_base_url` semantics: it always starts
    /// and ends with `/`.
    pub fn new(table: RouteTable, base_url: &str) -> Self {
        Self {
            table,
            base_url: crate::config::normalize_base_url(base_url),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// parse_target
    ///
    /// Turns a raw target (`/app/files?sort=name#top`) into an application location
    /// (`/files`, query `sort=name`). Fragments are dropped.
    pub fn parse_target(&self, target: &str) -> Result<Location, NavigationError> {
        if !target.starts_with('/') {
            return Err(NavigationError::NotAbsolute(target.to_string()));
        }

        let without_fragment = target.split('#').next().unwrap_or(target);
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, "")) => (path, None),
            Some((path, query)) => (path, Some(query.to_string())),
            None => (without_fragment, None),
        };

        let app_path = if path == self.base_url.trim_end_matches('/') {
            "/".to_string()
        } else {
            let rest = path
                .strip_prefix(self.base_url.as_str())
                .ok_or_else(|| NavigationError::OutsideBase {
                    target: target.to_string(),
                    base: self.base_url.clone(),
                })?;
            format!("/{rest}")
        };

        Ok(Location {
            path: app_path,
            query,
        })
    }

    /// href
    ///
    /// The browser-facing form of an application location, with the base URL prefixed.
    pub fn href(&self, location: &Location) -> String {
        let prefix = self.base_url.trim_end_matches('/');
        format!("{prefix}{location}")
    }

    /// navigate
    ///
    /// Resolves one navigation attempt completely. Unknown paths carry no access requirement and
    /// proceed. Each redirect target is guarded again; the chain is denied once it revisits a
    /// route. Redirects only ever target the login or root route, so a chain is at most three
    /// routes long.
    pub fn navigate(
        &self,
        target: &str,
        session: &SessionContext,
    ) -> Result<Navigation, NavigationError> {
        let requested = self.parse_target(target)?;
        let matched = self.table.match_path(&requested.path);

        let requirement = matched
            .as_ref()
            .map(|m| m.entry.access)
            .unwrap_or(AccessRequirement::None);

        let mut decision = guard::evaluate(requirement, session);
        if decision == GuardDecision::Proceed {
            tracing::debug!(
                to = %requested,
                route = ?matched.as_ref().map(|m| &m.entry.name),
                "navigation allowed"
            );
            let (route, params) = match matched {
                Some(m) => (Some(m.entry.name.clone()), m.params),
                None => (None, RouteParams::new()),
            };
            return Ok(Navigation::Proceed {
                location: requested,
                route,
                params,
            });
        }

        let first_reason = redirect_reason(decision);
        let mut chain: Vec<String> = matched
            .map(|m| m.entry.name.clone())
            .into_iter()
            .collect();

        loop {
            let Some(next) = self.redirect_target(decision) else {
                tracing::warn!(to = %requested, "redirect to login requested but no login route");
                return Ok(Navigation::Denied {
                    requested,
                    reason: DenyReason::NoLoginRoute,
                });
            };

            let revisited = chain.contains(&next.name);
            chain.push(next.name.clone());
            if revisited {
                tracing::warn!(to = %requested, chain = ?chain, "navigation denied");
                return Ok(Navigation::Denied {
                    requested,
                    reason: DenyReason::RedirectLoop(chain),
                });
            }

            decision = guard::evaluate(next.access, session);
            if decision == GuardDecision::Proceed {
                // Redirect targets are parameter-free, checked when the table is built.
                let path = next
                    .path
                    .href(&RouteParams::new())
                    .unwrap_or_else(|_| next.path.as_str().to_string());
                let location = Location::new(path);
                tracing::info!(
                    to = %requested,
                    redirect = %location,
                    reason = %first_reason,
                    "navigation redirected"
                );
                return Ok(Navigation::Redirected {
                    requested,
                    location,
                    route: next.name.clone(),
                    reason: first_reason,
                });
            }
        }
    }

    fn redirect_target(&self, decision: GuardDecision) -> Option<&RouteEntry> {
        match decision {
            GuardDecision::RedirectToLogin => self.table.login(),
            GuardDecision::RedirectToRoot => Some(self.table.root()),
            GuardDecision::Proceed => None,
        }
    }
}

fn redirect_reason(decision: GuardDecision) -> RedirectReason {
    match decision {
        GuardDecision::RedirectToRoot => RedirectReason::GuestOnly,
        _ => RedirectReason::AuthenticationRequired,
    }
}
