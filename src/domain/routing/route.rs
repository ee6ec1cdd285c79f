//! Static route definitions

use std::fmt;

use once_cell::sync::Lazy;

use super::RoutePolicy;

/// Named routes of the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    Login,
    Signup,
    Dashboard,
    Profile,
    MedicalRecords,
    DoctorPanel,
    AdminPanel,
}

impl RouteName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Login",
            Self::Signup => "Signup",
            Self::Dashboard => "Dashboard",
            Self::Profile => "Profile",
            Self::MedicalRecords => "MedicalRecords",
            Self::DoctorPanel => "DoctorPanel",
            Self::AdminPanel => "AdminPanel",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Dashboard => "/dashboard",
            Self::Profile => "/perfil",
            Self::MedicalRecords => "/historial",
            Self::DoctorPanel => "/medico",
            Self::AdminPanel => "/admin",
        }
    }

    /// Resolve a path, ignoring query string and trailing slash
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        route_table()
            .iter()
            .find(|route| route.name.path() == path)
            .map(|route| route.name)
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A route and its immutable access policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub name: RouteName,
    pub policy: RoutePolicy,
}

static ROUTES: Lazy<Vec<RouteDefinition>> = Lazy::new(|| {
    vec![
        RouteDefinition {
            name: RouteName::Home,
            policy: RoutePolicy::public(),
        },
        RouteDefinition {
            name: RouteName::Login,
            policy: RoutePolicy::guest(),
        },
        RouteDefinition {
            name: RouteName::Signup,
            policy: RoutePolicy::guest(),
        },
        RouteDefinition {
            name: RouteName::Dashboard,
            policy: RoutePolicy::authenticated(),
        },
        RouteDefinition {
            name: RouteName::Profile,
            policy: RoutePolicy::authenticated(),
        },
        RouteDefinition {
            name: RouteName::MedicalRecords,
            policy: RoutePolicy::authenticated(),
        },
        RouteDefinition {
            name: RouteName::DoctorPanel,
            policy: RoutePolicy::with_role("MEDICO"),
        },
        RouteDefinition {
            name: RouteName::AdminPanel,
            policy: RoutePolicy::with_role("ADMIN"),
        },
    ]
});

/// All routes of the portal
pub fn route_table() -> &'static [RouteDefinition] {
    &ROUTES
}

/// Look up the definition of a named route
pub fn find_route(name: RouteName) -> Option<&'static RouteDefinition> {
    route_table().iter().find(|route| route.name == name)
}
