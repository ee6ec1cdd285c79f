use std::fmt::Debug;
use std::sync::Arc;

use super::StoredCredentials;
use crate::domain::token::RoleSet;

/// Durable key-value storage for the session credentials.
///
/// Every operation is synchronous and total: failures of the backing medium
/// are absorbed by the implementation and read back as absent values. Writes
/// replace all three fields at once so readers never see a mix of two sessions.
pub trait CredentialStore: Send + Sync + Debug {
    /// Read the persisted credentials; each field may be absent
    fn get(&self) -> StoredCredentials;

    /// Replace the persisted credentials in a single write
    fn set(&self, token: &str, expires_at_ms: Option<i64>, roles: &RoleSet);

    /// Remove every persisted field
    fn clear(&self);
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn get(&self) -> StoredCredentials {
        (**self).get()
    }

    fn set(&self, token: &str, expires_at_ms: Option<i64>, roles: &RoleSet) {
        (**self).set(token, expires_at_ms, roles)
    }

    fn clear(&self) {
        (**self).clear()
    }
}
