//! Route metadata and the navigation guard

mod guard;
mod policy;
mod route;

pub use guard::{NavigationDecision, NavigationGuard};
pub use policy::RoutePolicy;
pub use route::{find_route, route_table, RouteDefinition, RouteName};
