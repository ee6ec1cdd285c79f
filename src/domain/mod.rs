//! Domain layer - session types and pure logic

pub mod account;
pub mod credentials;
pub mod error;
pub mod routing;
pub mod session;
pub mod token;

pub use account::{Identity, LoginCredentials, PasswordChange, SignupProfile};
pub use credentials::{CredentialStore, StoredCredentials};
pub use error::{AuthError, AuthFailureKind};
pub use routing::{
    find_route, route_table, NavigationDecision, NavigationGuard, RouteDefinition, RouteName,
    RoutePolicy,
};
pub use session::{SessionSnapshot, SessionState, UnknownExpiryPolicy};
pub use token::{decode, expiry_ms, extract_roles, Claims, RoleSet};
