//! Infrastructure layer - storage, HTTP and session implementations

pub mod auth;
pub mod credentials;
pub mod logging;
pub mod session;
