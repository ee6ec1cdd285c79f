//! Session manager: login, logout, refresh and lazy expiry

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::account::{Identity, LoginCredentials, PasswordChange, SignupProfile};
use crate::domain::credentials::CredentialStore;
use crate::domain::routing::{find_route, NavigationDecision, NavigationGuard, RouteName};
use crate::domain::session::{SessionSnapshot, SessionState, UnknownExpiryPolicy};
use crate::domain::token::{self, Claims, RoleSet};
use crate::domain::AuthError;
use crate::infrastructure::auth::{AuthApi, BearerInterceptor, TokenResponse};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    /// Relative lifetime reported by the backend, in milliseconds
    pub expiration_hint_ms: Option<i64>,
    /// Absolute expiry that was persisted
    pub expires_at_ms: Option<i64>,
    pub roles: RoleSet,
    pub user: Option<Value>,
}

/// Owns the authentication lifecycle of one session.
///
/// The manager is the only writer of the credential store. Session state is
/// never cached: every read goes back to the store.
#[derive(Debug)]
pub struct SessionManager<A: AuthApi, S: CredentialStore> {
    api: Arc<A>,
    store: Arc<S>,
    unknown_expiry: UnknownExpiryPolicy,
}

impl<A: AuthApi, S: CredentialStore> SessionManager<A, S> {
    pub fn new(api: Arc<A>, store: Arc<S>) -> Self {
        Self {
            api,
            store,
            unknown_expiry: UnknownExpiryPolicy::default(),
        }
    }

    /// Set how tokens without any resolvable expiry are treated
    pub fn with_unknown_expiry(mut self, policy: UnknownExpiryPolicy) -> Self {
        self.unknown_expiry = policy;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Interceptor that decorates outgoing requests with the current token
    pub fn interceptor(&self) -> BearerInterceptor<S> {
        BearerInterceptor::new(self.store.clone())
    }

    /// Authenticate and persist the new session
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, AuthError> {
        info!(nif = %credentials.nif, "Logging in");

        let response = self.api.login(credentials).await.inspect_err(|e| {
            warn!(kind = ?e.kind(), "Login failed");
        })?;

        let (expires_at_ms, roles) = self.persist(&response)?;
        info!(roles = ?roles, "Login succeeded");

        Ok(LoginOutcome {
            token: response.token,
            expiration_hint_ms: response.expiration_hint_ms,
            expires_at_ms,
            roles,
            user: response.user,
        })
    }

    /// End the session. The remote call is best-effort; local credentials are
    /// always cleared, even when the backend is unreachable.
    pub async fn logout(&self) {
        if let Some(token) = self.current_token() {
            if let Err(e) = self.api.logout(&token).await {
                warn!(error = %e, "Remote logout failed, clearing local session anyway");
            }
        }

        self.store.clear();
        info!("Logged out");
    }

    /// Replace the current token with a fresh one.
    ///
    /// Any failure ends the session: the store is cleared before the error is
    /// returned.
    pub async fn refresh_token(&self) -> Result<String, AuthError> {
        let result = match self.store.get().token {
            Some(token) if token::is_well_formed(&token) => self.api.refresh(&token).await,
            Some(_) => Err(AuthError::MalformedToken),
            None => Err(AuthError::Unauthenticated),
        };

        let outcome = result.and_then(|response| {
            self.persist(&response)?;
            Ok(response.token)
        });

        match outcome {
            Ok(token) => {
                debug!("Token refreshed");
                Ok(token)
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "Token refresh failed, ending session");
                self.logout().await;
                Err(e)
            }
        }
    }

    /// Whether the stored token is still valid.
    ///
    /// An expired token is cleared from the store as a side effect.
    pub fn is_authenticated(&self) -> bool {
        let stored = self.store.get();
        let Some(token) = stored.token.filter(|t| token::is_well_formed(t)) else {
            return false;
        };

        match token::expiry_ms(&token, stored.expires_at_ms) {
            Some(expires_at) if now_ms() < expires_at => true,
            Some(_) => {
                info!("Session expired");
                self.store.clear();
                false
            }
            None => self.unknown_expiry == UnknownExpiryPolicy::Allow,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Claims of the stored token, decoded afresh on every call
    pub fn current_principal(&self) -> Option<Claims> {
        self.current_token().and_then(|token| token::decode(&token))
    }

    /// Persisted role set, falling back to the roles carried by the token
    pub fn roles(&self) -> RoleSet {
        let stored = self.store.get();
        if !stored.roles.is_empty() {
            return stored.roles;
        }

        stored
            .token
            .as_deref()
            .and_then(token::decode)
            .map(|claims| claims.roles())
            .unwrap_or_default()
    }

    /// Read-only view of the session for the guard and the UI
    pub fn snapshot(&self) -> SessionSnapshot {
        let authenticated = self.is_authenticated();
        let stored = self.store.get();
        let principal = stored
            .token
            .as_deref()
            .filter(|t| token::is_well_formed(t))
            .and_then(token::decode);

        let roles = if stored.roles.is_empty() {
            principal.as_ref().map(Claims::roles).unwrap_or_default()
        } else {
            stored.roles
        };

        SessionSnapshot {
            token: stored.token,
            expires_at_ms: stored.expires_at_ms,
            roles,
            principal,
            authenticated,
        }
    }

    /// Run the navigation guard for a route against the current session
    pub fn authorize(&self, route: RouteName) -> NavigationDecision {
        let Some(definition) = find_route(route) else {
            return NavigationDecision::Allow;
        };

        let decision = NavigationGuard::decide(&definition.policy, &self.snapshot());
        debug!(route = %route, decision = ?decision, "Navigation checked");
        decision
    }

    /// Register a new account; the current session is left untouched
    pub async fn signup(&self, profile: &SignupProfile) -> Result<Identity, AuthError> {
        info!(nif = %profile.nif, "Registering account");
        self.api.signup(profile).await
    }

    /// Change the password; the session ends once the backend accepts it
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), AuthError> {
        let token = self.current_token().ok_or(AuthError::Unauthenticated)?;

        self.api
            .change_password(&token, &PasswordChange::new(current, new))
            .await?;

        info!("Password changed, ending session");
        self.store.clear();
        Ok(())
    }

    /// Delete the account; the session ends once the backend accepts it
    pub async fn delete_account(&self) -> Result<(), AuthError> {
        let token = self.current_token().ok_or(AuthError::Unauthenticated)?;

        self.api.delete_account(&token).await?;

        info!("Account deleted, ending session");
        self.store.clear();
        Ok(())
    }

    /// Display name of the current user, `None` without a valid session
    pub async fn principal_summary(&self) -> Result<Option<String>, AuthError> {
        if !self.is_authenticated() {
            return Ok(None);
        }

        match self.current_token() {
            Some(token) => self.api.fetch_principal_summary(&token).await,
            None => Ok(None),
        }
    }

    /// Stored token if it has the three-segment shape; anything else counts as absent
    fn current_token(&self) -> Option<String> {
        self.store.get().token.filter(|t| token::is_well_formed(t))
    }

    /// Write token, expiry and roles in one store write
    fn persist(&self, response: &TokenResponse) -> Result<(Option<i64>, RoleSet), AuthError> {
        if !token::is_well_formed(&response.token) {
            return Err(AuthError::server("Auth backend returned a malformed token"));
        }

        let claims = token::decode(&response.token);
        if claims.is_none() {
            debug!("Token claims could not be decoded");
        }

        let expires_at_ms = claims
            .as_ref()
            .and_then(Claims::expires_at_ms)
            .or_else(|| response.expiration_hint_ms.map(|hint| now_ms().saturating_add(hint)));

        let roles = claims.as_ref().map(Claims::roles).unwrap_or_default();

        self.store.set(&response.token, expires_at_ms, &roles);
        Ok((expires_at_ms, roles))
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::StoredCredentials;
    use crate::infrastructure::auth::MockAuthApi;
    use crate::infrastructure::credentials::InMemoryCredentialStore;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use serde_json::json;

    fn token_with(claims: Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.c2lnbmF0dXJl", header, payload)
    }

    fn secs_from_now(offset: i64) -> i64 {
        Utc::now().timestamp() + offset
    }

    fn roles(items: &[&str]) -> RoleSet {
        items.iter().map(|r| r.to_string()).collect()
    }

    fn manager_with(
        api: MockAuthApi,
        stored: StoredCredentials,
    ) -> SessionManager<MockAuthApi, InMemoryCredentialStore> {
        SessionManager::new(
            Arc::new(api),
            Arc::new(InMemoryCredentialStore::with_credentials(stored)),
        )
    }

    fn signed_in(token: &str) -> StoredCredentials {
        StoredCredentials::new(token, None, RoleSet::new())
    }

    #[test]
    fn test_future_exp_is_authenticated_and_kept() {
        let token = token_with(json!({"exp": secs_from_now(3600)}));
        let manager = manager_with(MockAuthApi::new(), signed_in(&token));

        assert!(manager.is_authenticated());
        assert_eq!(manager.state(), SessionState::Authenticated);
        assert_eq!(manager.store().get().token.as_deref(), Some(token.as_str()));
    }

    #[test]
    fn test_past_exp_clears_store() {
        let token = token_with(json!({"exp": secs_from_now(-60)}));
        let manager = manager_with(
            MockAuthApi::new(),
            StoredCredentials::new(&token, Some(0), roles(&["ROLE_ADMIN"])),
        );

        assert!(!manager.is_authenticated());
        assert!(manager.store().get().is_empty());
    }

    #[test]
    fn test_fallback_expiry_used_without_exp_claim() {
        let token = token_with(json!({"sub": "12345678Z"}));
        let expired = StoredCredentials::new(&token, Some(now_ms() - 1_000), RoleSet::new());
        let manager = manager_with(MockAuthApi::new(), expired);

        assert!(!manager.is_authenticated());
        assert!(manager.store().get().is_empty());

        let valid = StoredCredentials::new(&token, Some(now_ms() + 60_000), RoleSet::new());
        let manager = manager_with(MockAuthApi::new(), valid);
        assert!(manager.is_authenticated());
    }

    #[test]
    fn test_unknown_expiry_policy() {
        let token = token_with(json!({"sub": "12345678Z"}));

        let allow = manager_with(MockAuthApi::new(), signed_in(&token));
        assert!(allow.is_authenticated());

        let deny = manager_with(MockAuthApi::new(), signed_in(&token))
            .with_unknown_expiry(UnknownExpiryPolicy::Deny);
        assert!(!deny.is_authenticated());
        assert!(deny.store().get().token.is_some());
    }

    #[test]
    fn test_malformed_stored_token_is_absent() {
        let manager = manager_with(MockAuthApi::new(), signed_in("not-a-token"));

        assert!(!manager.is_authenticated());
        assert!(manager.current_principal().is_none());
        assert!(!manager.snapshot().authenticated);
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let exp = secs_from_now(3600);
        let token = token_with(json!({"sub": "admin", "exp": exp, "authorities": ["ROLE_ADMIN"]}));

        let mut api = MockAuthApi::new();
        let issued = token.clone();
        api.expect_login()
            .times(1)
            .returning(move |_| Ok(TokenResponse::new(issued.clone()).with_expiration_hint_ms(1)));

        let manager = manager_with(api, StoredCredentials::default());
        let outcome = manager
            .login(&LoginCredentials::new("admin", "secreto"))
            .await
            .unwrap();

        assert_eq!(outcome.token, token);
        assert_eq!(outcome.expiration_hint_ms, Some(1));
        assert_eq!(outcome.expires_at_ms, Some(exp * 1000));
        assert_eq!(outcome.roles, roles(&["ROLE_ADMIN"]));

        let principal = manager.current_principal().unwrap();
        assert_eq!(principal.exp(), Some(exp as f64));
        assert_eq!(manager.roles(), roles(&["ROLE_ADMIN"]));

        let stored = manager.store().get();
        assert_eq!(stored.expires_at_ms, Some(exp * 1000));
        assert_eq!(stored.roles, roles(&["ROLE_ADMIN"]));
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_without_exp_uses_hint() {
        let token = token_with(json!({"sub": "paciente", "roles": ["paciente"]}));

        let mut api = MockAuthApi::new();
        let issued = token.clone();
        api.expect_login()
            .returning(move |_| Ok(TokenResponse::new(issued.clone()).with_expiration_hint_ms(60_000)));

        let manager = manager_with(api, StoredCredentials::default());
        let before = now_ms();
        let outcome = manager.login(&LoginCredentials::new("p", "x")).await.unwrap();

        let expires_at = outcome.expires_at_ms.unwrap();
        assert!(expires_at >= before + 60_000);
        assert!(expires_at <= now_ms() + 60_000);
        assert_eq!(manager.store().get().roles, roles(&["PACIENTE"]));
    }

    #[tokio::test]
    async fn test_login_with_huge_hint_saturates_expiry() {
        let token = token_with(json!({"sub": "paciente"}));
        let body = json!({"token": token, "expirationTime": 1e30});

        let mut api = MockAuthApi::new();
        api.expect_login()
            .returning(move |_| TokenResponse::from_json(&body));

        let manager = manager_with(api, StoredCredentials::default());
        let outcome = manager
            .login(&LoginCredentials::new("paciente", "secreto"))
            .await
            .unwrap();

        assert_eq!(outcome.expires_at_ms, Some(i64::MAX));
        assert_eq!(manager.store().get().expires_at_ms, Some(i64::MAX));
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_failure_leaves_store_untouched() {
        let mut api = MockAuthApi::new();
        api.expect_login()
            .returning(|_| Err(AuthError::invalid_credentials("Credenciales incorrectas")));

        let manager = manager_with(api, StoredCredentials::default());
        let err = manager
            .login(&LoginCredentials::new("x", "bad"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::domain::AuthFailureKind::InvalidCredentials);
        assert!(manager.store().get().is_empty());
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_token() {
        let mut api = MockAuthApi::new();
        api.expect_login()
            .returning(|_| Ok(TokenResponse::new("opaque-session-id")));

        let manager = manager_with(api, StoredCredentials::default());
        let err = manager.login(&LoginCredentials::new("x", "y")).await.unwrap_err();

        assert!(matches!(err, AuthError::ServerError { .. }));
        assert!(manager.store().get().is_empty());
    }

    #[tokio::test]
    async fn test_logout_with_unreachable_backend() {
        let token = token_with(json!({"exp": secs_from_now(3600)}));
        let mut api = MockAuthApi::new();
        api.expect_logout()
            .times(1)
            .returning(|_| Err(AuthError::unknown("connection refused")));

        let manager = manager_with(api, signed_in(&token));
        manager.logout().await;

        assert!(!manager.is_authenticated());
        assert!(manager.store().get().is_empty());
    }

    #[test]
    fn test_logout_without_session_skips_backend() {
        let mut api = MockAuthApi::new();
        api.expect_logout().times(0);

        let manager = manager_with(api, StoredCredentials::default());
        tokio_test::block_on(manager.logout());

        assert!(manager.store().get().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_success_replaces_token() {
        let old = token_with(json!({"exp": secs_from_now(10)}));
        let new_exp = secs_from_now(7200);
        let new = token_with(json!({"exp": new_exp, "authorities": ["ROLE_MEDICO"]}));

        let mut api = MockAuthApi::new();
        let sent = old.clone();
        let issued = new.clone();
        api.expect_refresh()
            .withf(move |token| token == sent)
            .times(1)
            .returning(move |_| Ok(TokenResponse::new(issued.clone())));

        let manager = manager_with(api, signed_in(&old));
        let token = manager.refresh_token().await.unwrap();

        assert_eq!(token, new);
        let stored = manager.store().get();
        assert_eq!(stored.token.as_deref(), Some(new.as_str()));
        assert_eq!(stored.expires_at_ms, Some(new_exp * 1000));
        assert_eq!(stored.roles, roles(&["ROLE_MEDICO"]));
    }

    #[tokio::test]
    async fn test_refresh_failure_ends_session() {
        let token = token_with(json!({"exp": secs_from_now(3600)}));

        let mut api = MockAuthApi::new();
        api.expect_refresh().returning(|_| Err(AuthError::Timeout));
        api.expect_logout().times(1).returning(|_| Ok(()));

        let manager = manager_with(
            api,
            StoredCredentials::new(&token, Some(now_ms() + 10_000), roles(&["ROLE_ADMIN"])),
        );

        let err = manager.refresh_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Timeout));
        assert!(manager.store().get().is_empty());
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_without_session() {
        let mut api = MockAuthApi::new();
        api.expect_refresh().times(0);
        api.expect_logout().times(0);

        let manager = manager_with(api, StoredCredentials::default());
        let err = manager.refresh_token().await.unwrap_err();

        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_refresh_with_malformed_token_ends_session() {
        let mut api = MockAuthApi::new();
        api.expect_refresh().times(0);
        api.expect_logout().times(0);

        let manager = manager_with(api, signed_in("opaque-session-id"));
        let err = manager.refresh_token().await.unwrap_err();

        assert!(matches!(err, AuthError::MalformedToken));
        assert!(manager.store().get().is_empty());
    }

    #[tokio::test]
    async fn test_logout_with_malformed_token_skips_backend() {
        let mut api = MockAuthApi::new();
        api.expect_logout().times(0);

        let manager = manager_with(api, signed_in("opaque-session-id"));
        manager.logout().await;

        assert!(manager.store().get().is_empty());
    }

    #[tokio::test]
    async fn test_change_password_ends_session() {
        let token = token_with(json!({"exp": secs_from_now(3600)}));
        let mut api = MockAuthApi::new();
        api.expect_change_password()
            .withf(|_, change| change.current_password == "old" && change.new_password == "newer1")
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = manager_with(api, signed_in(&token));
        manager.change_password("old", "newer1").await.unwrap();

        assert!(manager.store().get().is_empty());
    }

    #[tokio::test]
    async fn test_change_password_rejected_keeps_session() {
        let token = token_with(json!({"exp": secs_from_now(3600)}));
        let mut api = MockAuthApi::new();
        api.expect_change_password()
            .returning(|_, _| Err(AuthError::invalid_credentials("Contraseña actual incorrecta")));

        let manager = manager_with(api, signed_in(&token));
        let err = manager.change_password("wrong", "newer1").await.unwrap_err();

        assert_eq!(err.user_message(), "Contraseña actual incorrecta");
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_change_password_requires_session() {
        let mut api = MockAuthApi::new();
        api.expect_change_password().times(0);

        let manager = manager_with(api, StoredCredentials::default());
        let err = manager.change_password("a", "b").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_delete_account_ends_session() {
        let token = token_with(json!({"sub": "no-exp"}));
        let mut api = MockAuthApi::new();
        api.expect_delete_account().times(1).returning(|_| Ok(()));

        let manager = manager_with(api, signed_in(&token));
        manager.delete_account().await.unwrap();

        assert!(manager.store().get().is_empty());
    }

    #[tokio::test]
    async fn test_signup_does_not_touch_session() {
        let mut api = MockAuthApi::new();
        api.expect_signup()
            .returning(|_| Err(AuthError::conflict("El usuario ya existe")));

        let manager = manager_with(api, StoredCredentials::default());
        let profile = SignupProfile {
            nif: "12345678Z".to_string(),
            ..SignupProfile::default()
        };
        let err = manager.signup(&profile).await.unwrap_err();

        assert!(matches!(err, AuthError::Conflict { .. }));
        assert!(manager.store().get().is_empty());
    }

    #[tokio::test]
    async fn test_principal_summary() {
        let mut api = MockAuthApi::new();
        api.expect_fetch_principal_summary()
            .times(1)
            .returning(|_| Ok(Some("Ana Pérez".to_string())));

        let token = token_with(json!({"exp": secs_from_now(3600)}));
        let manager = manager_with(api, signed_in(&token));
        assert_eq!(
            manager.principal_summary().await.unwrap(),
            Some("Ana Pérez".to_string())
        );
    }

    #[tokio::test]
    async fn test_principal_summary_anonymous_skips_backend() {
        let mut api = MockAuthApi::new();
        api.expect_fetch_principal_summary().times(0);

        let manager = manager_with(api, StoredCredentials::default());
        assert_eq!(manager.principal_summary().await.unwrap(), None);
    }

    #[test]
    fn test_authorize_routes() {
        let token = token_with(json!({
            "exp": secs_from_now(3600),
            "authorities": ["ROLE_ADMINISTRADOR"]
        }));
        let manager = manager_with(MockAuthApi::new(), signed_in(&token));

        assert_eq!(manager.authorize(RouteName::AdminPanel), NavigationDecision::Allow);
        assert_eq!(
            manager.authorize(RouteName::DoctorPanel),
            NavigationDecision::RedirectTo(RouteName::Dashboard)
        );
        assert_eq!(
            manager.authorize(RouteName::Login),
            NavigationDecision::RedirectTo(RouteName::Dashboard)
        );

        let anonymous = manager_with(MockAuthApi::new(), StoredCredentials::default());
        assert_eq!(
            anonymous.authorize(RouteName::Dashboard),
            NavigationDecision::RedirectTo(RouteName::Login)
        );
        assert_eq!(anonymous.authorize(RouteName::Home), NavigationDecision::Allow);
    }

    #[test]
    fn test_snapshot_after_expiry_is_anonymous() {
        let token = token_with(json!({"exp": secs_from_now(-1), "authorities": ["ROLE_ADMIN"]}));
        let manager = manager_with(
            MockAuthApi::new(),
            StoredCredentials::new(&token, None, roles(&["ROLE_ADMIN"])),
        );

        let snapshot = manager.snapshot();
        assert!(!snapshot.authenticated);
        assert!(snapshot.token.is_none());
        assert!(snapshot.roles.is_empty());
        assert!(snapshot.principal.is_none());
    }

    #[test]
    fn test_roles_fall_back_to_token() {
        let token = token_with(json!({"exp": secs_from_now(3600), "scope": "read write"}));
        let manager = manager_with(MockAuthApi::new(), signed_in(&token));

        assert_eq!(manager.roles(), roles(&["READ", "WRITE"]));
        assert_eq!(manager.snapshot().roles, roles(&["READ", "WRITE"]));
    }

    #[test]
    fn test_interceptor_uses_session_token() {
        let token = token_with(json!({"exp": secs_from_now(3600)}));
        let manager = manager_with(MockAuthApi::new(), signed_in(&token));

        let header = manager.interceptor().header_value().unwrap();
        assert_eq!(header.to_str().unwrap(), format!("Bearer {}", token));
    }
}
