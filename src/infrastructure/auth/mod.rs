//! Remote authentication backend
//!
//! This module provides the auth API client, normalization of the token
//! responses it returns and the bearer interceptor for outgoing requests.

mod api;
mod http;
mod interceptor;
mod response;

pub use api::AuthApi;
pub use http::HttpAuthApi;
pub use interceptor::BearerInterceptor;
pub use response::TokenResponse;

#[cfg(test)]
pub use api::MockAuthApi;
