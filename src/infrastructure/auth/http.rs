//! HTTP implementation of the auth API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{AuthApi, TokenResponse};
use crate::config::{ApiConfig, AuthEndpoints};
use crate::domain::account::{Identity, LoginCredentials, PasswordChange, SignupProfile};
use crate::domain::error::DEFAULT_CREDENTIALS_MESSAGE;
use crate::domain::token::is_well_formed;
use crate::domain::AuthError;

/// Longest plain-text error body shown to the user as-is
const MAX_PLAIN_MESSAGE_LEN: usize = 200;

/// Auth API client over reqwest
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
    endpoints: AuthEndpoints,
}

impl HttpAuthApi {
    pub fn new(config: &ApiConfig) -> Result<Self, AuthError> {
        Self::with_timeout(
            config.base_url.clone(),
            config.endpoints.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        endpoints: AuthEndpoints,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoints,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AuthError> {
        let response = request.send().await.map_err(map_transport_error)?;
        debug!(status = %response.status(), url = %response.url(), "Auth backend responded");
        ensure_success(response).await
    }

    async fn send_for_token(&self, request: RequestBuilder) -> Result<TokenResponse, AuthError> {
        let response = self.send(request).await?;
        let body = read_json(response).await?;
        TokenResponse::from_json(&body)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<TokenResponse, AuthError> {
        let request = self
            .client
            .post(self.url(&self.endpoints.login))
            .json(credentials);

        self.send_for_token(request).await
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let request = self
            .client
            .post(self.url(&self.endpoints.logout))
            .bearer_auth(token);

        self.send(request).await.map(|_| ())
    }

    async fn refresh(&self, token: &str) -> Result<TokenResponse, AuthError> {
        let request = self
            .client
            .post(self.url(&self.endpoints.refresh))
            .bearer_auth(token);

        self.send_for_token(request).await
    }

    async fn signup(&self, profile: &SignupProfile) -> Result<Identity, AuthError> {
        let request = self
            .client
            .post(self.url(&self.endpoints.signup))
            .json(profile);

        let response = self.send(request).await?;
        let body = read_json(response).await?;

        serde_json::from_value(body)
            .map_err(|e| AuthError::server(format!("Unexpected signup response: {}", e)))
    }

    async fn change_password(
        &self,
        token: &str,
        change: &PasswordChange,
    ) -> Result<(), AuthError> {
        let request = self
            .client
            .put(self.url(&self.endpoints.change_password))
            .bearer_auth(token)
            .json(change);

        self.send(request).await.map(|_| ())
    }

    async fn delete_account(&self, token: &str) -> Result<(), AuthError> {
        let request = self
            .client
            .delete(self.url(&self.endpoints.delete_account))
            .bearer_auth(token);

        self.send(request).await.map(|_| ())
    }

    async fn fetch_principal_summary(&self, token: &str) -> Result<Option<String>, AuthError> {
        let response = self
            .client
            .get(self.url(&self.endpoints.principal_summary))
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let response = ensure_success(response).await?;
        let body = response.text().await.map_err(map_transport_error)?;

        Ok(summary_from_body(&body))
    }
}

fn map_transport_error(error: reqwest::Error) -> AuthError {
    if error.is_timeout() {
        AuthError::Timeout
    } else if error.is_decode() {
        AuthError::server(format!("Failed to read response: {}", error))
    } else {
        AuthError::unknown(format!("Request failed: {}", error))
    }
}

async fn ensure_success(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

/// Map a non-success status to a typed failure
fn status_error(status: StatusCode, body: &str) -> AuthError {
    let message = extract_message(body);

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AuthError::invalid_credentials(
                message.unwrap_or_else(|| DEFAULT_CREDENTIALS_MESSAGE.to_string()),
            )
        }
        StatusCode::CONFLICT => {
            AuthError::conflict(message.unwrap_or_else(|| "Account already exists".to_string()))
        }
        s if s.is_server_error() => AuthError::server(format!("HTTP {}", s)),
        s => AuthError::unknown(format!("HTTP {}", s)),
    }
}

/// Pull a human-readable message out of an error body
fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() || looks_like_html(body) {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => ["message", "error", "detail"]
            .iter()
            .find_map(|field| object.get(*field).and_then(Value::as_str))
            .map(str::to_string),
        Ok(Value::String(message)) => Some(message),
        Ok(_) => None,
        Err(_) if body.len() <= MAX_PLAIN_MESSAGE_LEN => Some(body.to_string()),
        Err(_) => None,
    }
}

async fn read_json(response: Response) -> Result<Value, AuthError> {
    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"));

    let body = response.text().await.map_err(map_transport_error)?;
    parse_json_body(&body, is_html)
}

/// Parse a success body that must carry JSON. A bare token is accepted as a JSON string.
fn parse_json_body(body: &str, is_html: bool) -> Result<Value, AuthError> {
    let body = body.trim();

    if is_html || looks_like_html(body) {
        return Err(AuthError::server("Expected JSON but received HTML"));
    }

    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(_) if is_well_formed(body) && !body.contains(char::is_whitespace) => {
            Ok(Value::String(body.to_string()))
        }
        Err(e) => Err(AuthError::server(format!("Invalid JSON response: {}", e))),
    }
}

fn summary_from_body(body: &str) -> Option<String> {
    let body = body.trim();

    let summary = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(name)) => name,
        Ok(Value::Object(object)) => ["nombre", "name", "displayName"]
            .iter()
            .find_map(|field| object.get(*field).and_then(Value::as_str))
            .map(str::to_string)?,
        Ok(Value::Null) => return None,
        _ => body.to_string(),
    };

    let summary = summary.trim();
    (!summary.is_empty()).then(|| summary.to_string())
}

fn looks_like_html(body: &str) -> bool {
    body.starts_with('<')
}
