//! Bearer credential decoration for outgoing requests
//!
//! The rest of the portal's HTTP calls (records, doctors, notifications) go
//! through this interceptor so every request carries the current token.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;

use crate::domain::credentials::CredentialStore;

/// Attaches `Authorization: Bearer <token>` when a token is stored
#[derive(Debug, Clone)]
pub struct BearerInterceptor<S: CredentialStore> {
    store: Arc<S>,
}

impl<S: CredentialStore> BearerInterceptor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Header value for the current token, if any
    pub fn header_value(&self) -> Option<HeaderValue> {
        let token = self.store.get().token?;
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).ok()?;
        value.set_sensitive(true);
        Some(value)
    }

    /// Decorate a header map in place; leaves it untouched without a token
    pub fn decorate(&self, headers: &mut HeaderMap) {
        if let Some(value) = self.header_value() {
            headers.insert(AUTHORIZATION, value);
        }
    }

    /// Decorate a reqwest request builder
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.header_value() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }
}
