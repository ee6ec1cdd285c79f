//! In-memory credential store

use std::sync::{PoisonError, RwLock};

use crate::domain::credentials::{CredentialStore, StoredCredentials};
use crate::domain::token::RoleSet;

/// In-memory implementation of CredentialStore
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<StoredCredentials>,
}

impl InMemoryCredentialStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial credentials
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            credentials: RwLock::new(credentials),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self) -> StoredCredentials {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str, expires_at_ms: Option<i64>, roles: &RoleSet) {
        let mut credentials = self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *credentials = StoredCredentials::new(token, expires_at_ms, roles.clone());
    }

    fn clear(&self) {
        let mut credentials = self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *credentials = StoredCredentials::default();
    }
}
