//! HCC Session
//!
//! Session and authentication core of the HCC clinical-records portal:
//! - Credential persistence (token, absolute expiry, role list)
//! - Unverified decoding of token claims and role extraction
//! - Session lifecycle against the remote auth backend
//! - Route authorization guard

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::AuthError;
use infrastructure::{
    auth::HttpAuthApi, credentials::FileCredentialStore, session::SessionManager,
};
use tracing::debug;

/// Session manager backed by the HTTP auth client and the file store
pub type PortalSession = SessionManager<HttpAuthApi, FileCredentialStore>;

/// Build the session manager described by the configuration
pub fn create_session_manager(config: &AppConfig) -> Result<PortalSession, AuthError> {
    let api = HttpAuthApi::new(&config.api)?;
    let store = FileCredentialStore::new(&config.session.store_path, &config.session.origin);

    debug!(
        base_url = %config.api.base_url,
        store = %config.session.store_path.display(),
        "Session manager created"
    );

    Ok(SessionManager::new(Arc::new(api), Arc::new(store))
        .with_unknown_expiry(config.session.unknown_expiry))
}
