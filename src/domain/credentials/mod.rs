//! Credential persistence domain

mod store;
mod stored;

pub use store::CredentialStore;
pub use stored::{StoredCredentials, EXPIRY_KEY, ROLES_KEY, TOKEN_KEY};
