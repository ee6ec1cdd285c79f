use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Login form: national identity number and password
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub nif: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(nif: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            nif: nif.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("nif", &self.nif)
            .field("password", &"[hidden]")
            .finish()
    }
}

/// Registration profile sent to the signup endpoint
#[derive(Clone, Default, Serialize)]
pub struct SignupProfile {
    pub nif: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido1", skip_serializing_if = "Option::is_none")]
    pub first_surname: Option<String>,
    #[serde(rename = "apellido2", skip_serializing_if = "Option::is_none")]
    pub second_surname: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "fechaNacimiento", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

impl fmt::Debug for SignupProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupProfile")
            .field("nif", &self.nif)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[hidden]")
            .finish_non_exhaustive()
    }
}

/// Identity returned by the backend after signup
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub nif: Option<String>,
    #[serde(default, rename = "nombre")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Best-effort display label
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.nif.as_deref())
            .or(self.email.as_deref())
    }
}

/// Password change request body
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl PasswordChange {
    pub fn new(current: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            current_password: current.into(),
            new_password: new.into(),
        }
    }
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}
