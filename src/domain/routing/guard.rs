//! Navigation guard

use super::{RouteName, RoutePolicy};
use crate::domain::session::SessionSnapshot;

/// Outcome of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    RedirectTo(RouteName),
}

impl NavigationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides, before every transition, whether the session may enter a route
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationGuard;

impl NavigationGuard {
    /// Rules are evaluated in order: authentication, guest-only, role.
    pub fn decide(policy: &RoutePolicy, session: &SessionSnapshot) -> NavigationDecision {
        if policy.requires_auth && !session.authenticated {
            return NavigationDecision::RedirectTo(RouteName::Login);
        }

        if policy.requires_guest && session.authenticated {
            return NavigationDecision::RedirectTo(RouteName::Dashboard);
        }

        if let Some(role) = &policy.requires_role {
            if !session.has_role_matching(role) {
                return NavigationDecision::RedirectTo(RouteName::Dashboard);
            }
        }

        NavigationDecision::Allow
    }
}
