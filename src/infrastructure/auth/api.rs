use async_trait::async_trait;

use super::TokenResponse;
use crate::domain::account::{Identity, LoginCredentials, PasswordChange, SignupProfile};
use crate::domain::AuthError;

#[cfg(test)]
use mockall::automock;

/// Auth endpoints of the backend. Authenticated calls receive the bearer token.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token
    async fn login(&self, credentials: &LoginCredentials) -> Result<TokenResponse, AuthError>;

    /// Invalidate the token server-side
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// Exchange the current token for a fresh one
    async fn refresh(&self, token: &str) -> Result<TokenResponse, AuthError>;

    /// Register a new account
    async fn signup(&self, profile: &SignupProfile) -> Result<Identity, AuthError>;

    async fn change_password(&self, token: &str, change: &PasswordChange)
        -> Result<(), AuthError>;

    async fn delete_account(&self, token: &str) -> Result<(), AuthError>;

    /// Display name of the authenticated user; `None` when the backend rejects the token
    async fn fetch_principal_summary(&self, token: &str) -> Result<Option<String>, AuthError>;
}
