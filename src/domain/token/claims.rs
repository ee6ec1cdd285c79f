//! Claims payload of a decoded token

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::roles::{extract_roles, RoleSet};

/// Claims mapping carried in the middle segment of a token
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Get a raw claim value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Expiry in seconds since the epoch, if present and finite.
    ///
    /// Numeric strings are accepted since some issuers serialize `exp` that way.
    pub fn exp(&self) -> Option<f64> {
        let value = match self.0.get("exp")? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };

        value.is_finite().then_some(value)
    }

    /// Expiry converted to milliseconds since the epoch
    pub fn expires_at_ms(&self) -> Option<i64> {
        self.exp().map(|secs| (secs * 1000.0) as i64)
    }

    /// Subject claim (the user's NIF on this backend)
    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    /// Canonical role set carried by the claims
    pub fn roles(&self) -> RoleSet {
        extract_roles(self)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
