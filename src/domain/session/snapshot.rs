use std::fmt;

use serde::Deserialize;

use crate::domain::token::{Claims, RoleSet};

/// Externally observable session state.
///
/// Expiry is detected lazily and collapses straight to `Anonymous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// How to treat a stored token whose expiry cannot be determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownExpiryPolicy {
    /// Consider the session valid (non-expiring)
    #[default]
    Allow,
    /// Consider the session unauthenticated
    Deny,
}

/// Read-only view of the session, derived from the credential store
#[derive(Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub expires_at_ms: Option<i64>,
    pub roles: RoleSet,
    pub principal: Option<Claims>,
    pub authenticated: bool,
}

impl SessionSnapshot {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.authenticated {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Whether any role, upper-cased, contains `required` as a substring.
    ///
    /// Containment rather than equality lets `ADMIN` match `ROLE_ADMIN`. The
    /// required role is trimmed and upper-cased too, so `admin` behaves like `ADMIN`.
    pub fn has_role_matching(&self, required: &str) -> bool {
        let required = required.trim().to_uppercase();
        self.roles
            .iter()
            .any(|role| role.to_uppercase().contains(&required))
    }
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("token", &self.token.as_ref().map(|_| "[hidden]"))
            .field("expires_at_ms", &self.expires_at_ms)
            .field("roles", &self.roles)
            .field("principal", &self.principal.as_ref().and_then(|c| c.subject()))
            .field("authenticated", &self.authenticated)
            .finish()
    }
}
