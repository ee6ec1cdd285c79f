//! Persisted session credentials and their key-value layout

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::token::{normalize_role, RoleSet};

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "authToken";
/// Storage key of the absolute expiry, milliseconds since the epoch
pub const EXPIRY_KEY: &str = "authTokenExpiry";
/// Storage key of the comma-joined role list
pub const ROLES_KEY: &str = "authRoles";

/// Snapshot of the credential store
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub token: Option<String>,
    pub expires_at_ms: Option<i64>,
    pub roles: RoleSet,
}

impl StoredCredentials {
    pub fn new(token: impl Into<String>, expires_at_ms: Option<i64>, roles: RoleSet) -> Self {
        Self {
            token: Some(token.into()),
            expires_at_ms,
            roles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.expires_at_ms.is_none() && self.roles.is_empty()
    }

    /// Roles in their persisted comma-joined form
    pub fn roles_joined(&self) -> String {
        self.roles.iter().cloned().collect::<Vec<_>>().join(",")
    }

    /// Parse a comma-joined role list, skipping empty entries
    pub fn parse_roles(joined: &str) -> RoleSet {
        joined.split(',').filter_map(normalize_role).collect()
    }

    /// Rebuild credentials from raw key-value entries. Unparseable values read as absent.
    pub fn from_entries(entries: &BTreeMap<String, String>) -> Self {
        let token = entries
            .get(TOKEN_KEY)
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let expires_at_ms = entries.get(EXPIRY_KEY).and_then(|raw| parse_millis(raw));

        let roles = entries
            .get(ROLES_KEY)
            .map(|joined| Self::parse_roles(joined))
            .unwrap_or_default();

        Self {
            token,
            expires_at_ms,
            roles,
        }
    }

    /// Flatten into key-value entries; absent fields produce no entry
    pub fn to_entries(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();

        if let Some(token) = &self.token {
            entries.insert(TOKEN_KEY.to_string(), token.clone());
        }
        if let Some(expiry) = self.expires_at_ms {
            entries.insert(EXPIRY_KEY.to_string(), expiry.to_string());
        }
        if !self.roles.is_empty() {
            entries.insert(ROLES_KEY.to_string(), self.roles_joined());
        }

        entries
    }
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("token", &self.token.as_ref().map(|_| "[hidden]"))
            .field("expires_at_ms", &self.expires_at_ms)
            .field("roles", &self.roles)
            .finish()
    }
}

fn parse_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return Some(ms);
    }

    raw.parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite())
        .map(|ms| ms as i64)
}
