use serde::{Deserialize, Serialize};

/// Access requirements attached to a route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePolicy {
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub requires_guest: bool,
    #[serde(default)]
    pub requires_role: Option<String>,
}

impl RoutePolicy {
    /// No requirements
    pub fn public() -> Self {
        Self::default()
    }

    /// Only reachable with an authenticated session
    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            ..Self::default()
        }
    }

    /// Only reachable without a session (login, signup)
    pub fn guest() -> Self {
        Self {
            requires_guest: true,
            ..Self::default()
        }
    }

    /// Require a role; implies authentication
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            requires_auth: true,
            requires_role: Some(role.into()),
            ..Self::default()
        }
    }
}
