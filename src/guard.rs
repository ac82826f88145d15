use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// AccessRequirement
///
/// The access tag a route entry declares. Exactly one applies per route; a route that does not
/// declare one is open to everybody (`None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum AccessRequirement {
    /// Only authenticated users may enter. Anonymous users are sent to the login route.
    RequiresAuth,
    /// Only anonymous users may enter (login, registration). Authenticated users are sent home.
    RequiresGuest,
    #[default]
    None,
}

/// SessionContext
///
/// The authentication status handed to the guard for a single navigation attempt.
/// The guard never reads session storage itself; callers resolve this first
/// (see `session::load_context`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionContext {
    pub authenticated: bool,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self { authenticated: false }
    }

    pub fn authenticated() -> Self {
        Self { authenticated: true }
    }
}

/// GuardDecision
///
/// What the guard wants to happen to a navigation. Redirects name their target symbolically;
/// turning them into concrete locations is the navigator's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    RedirectToLogin,
    RedirectToRoot,
}

/// evaluate
///
/// The navigation guard. Pure and synchronous: the decision depends only on the target's
/// declared requirement and the session context.
pub fn evaluate(requirement: AccessRequirement, session: &SessionContext) -> GuardDecision {
    match requirement {
        AccessRequirement::RequiresAuth if !session.authenticated => GuardDecision::RedirectToLogin,
        AccessRequirement::RequiresGuest if session.authenticated => GuardDecision::RedirectToRoot,
        _ => GuardDecision::Proceed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_user_is_sent_to_login_from_protected_route() {
        let decision = evaluate(AccessRequirement::RequiresAuth, &SessionContext::anonymous());
        assert_eq!(decision, GuardDecision::RedirectToLogin);
    }

    #[test]
    fn authenticated_user_is_sent_home_from_guest_route() {
        let decision = evaluate(AccessRequirement::RequiresGuest, &SessionContext::authenticated());
        assert_eq!(decision, GuardDecision::RedirectToRoot);
    }

    #[test]
    fn every_other_combination_proceeds() {
        let cases = [
            (AccessRequirement::RequiresAuth, SessionContext::authenticated()),
            (AccessRequirement::RequiresGuest, SessionContext::anonymous()),
            (AccessRequirement::None, SessionContext::anonymous()),
            (AccessRequirement::None, SessionContext::authenticated()),
        ];
        for (requirement, session) in cases {
            assert_eq!(evaluate(requirement, &session), GuardDecision::Proceed);
        }
    }

    #[test]
    fn requirement_defaults_to_none() {
        assert_eq!(AccessRequirement::default(), AccessRequirement::None);
    }
}
