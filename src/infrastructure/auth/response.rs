//! Normalization of token responses
//!
//! The backend has answered login and refresh with several shapes over time:
//! a bare token string, `{token, expirationTime}`, `{token, user}`,
//! `{accessToken}` / `{access_token, expires_in}`, `{jwt}` and any of these
//! wrapped in a `data` envelope.

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::AuthError;

const TOKEN_FIELDS: [&str; 4] = ["token", "accessToken", "access_token", "jwt"];

/// Token issued by the backend, with an optional relative lifetime hint
#[derive(Clone, PartialEq)]
pub struct TokenResponse {
    pub token: String,
    /// Lifetime in milliseconds from now, when the backend reports one
    pub expiration_hint_ms: Option<i64>,
    /// Profile echoed back by some backend versions
    pub user: Option<Value>,
}

impl TokenResponse {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expiration_hint_ms: None,
            user: None,
        }
    }

    pub fn with_expiration_hint_ms(mut self, hint: i64) -> Self {
        self.expiration_hint_ms = Some(hint);
        self
    }

    /// Normalize any known response shape
    pub fn from_json(value: &Value) -> Result<Self, AuthError> {
        match value {
            Value::String(token) => Self::non_empty(token).map(Self::new),
            Value::Object(object) => {
                if let Some(found) = Self::from_object(object) {
                    return Ok(found);
                }

                object
                    .get("data")
                    .and_then(Value::as_object)
                    .and_then(Self::from_object)
                    .ok_or_else(|| AuthError::server("Token missing from auth response"))
            }
            _ => Err(AuthError::server("Unexpected auth response shape")),
        }
    }

    fn from_object(object: &Map<String, Value>) -> Option<Self> {
        let token = TOKEN_FIELDS
            .iter()
            .filter_map(|field| object.get(*field).and_then(Value::as_str))
            .find(|token| !token.trim().is_empty())?;

        Some(Self {
            token: token.trim().to_string(),
            expiration_hint_ms: expiration_hint(object),
            user: object.get("user").filter(|u| !u.is_null()).cloned(),
        })
    }

    fn non_empty(token: &str) -> Result<&str, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            Err(AuthError::server("Empty token in auth response"))
        } else {
            Ok(token)
        }
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token", &"[hidden]")
            .field("expiration_hint_ms", &self.expiration_hint_ms)
            .field("user", &self.user.is_some())
            .finish()
    }
}

/// `expirationTime` and `expiresIn` are milliseconds; OAuth-style `expires_in` is seconds.
/// Values beyond the `i64` range are clamped to `i64::MAX`.
fn expiration_hint(object: &Map<String, Value>) -> Option<i64> {
    let millis = ["expirationTime", "expiresIn"]
        .iter()
        .find_map(|field| object.get(*field).and_then(as_number));

    millis
        .or_else(|| object.get("expires_in").and_then(as_number).map(|s| s * 1000.0))
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        .map(|ms| ms.min(i64::MAX as f64) as i64)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
