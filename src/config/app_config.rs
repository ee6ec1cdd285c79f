use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::session::UnknownExpiryPolicy;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote auth backend
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub endpoints: AuthEndpoints,
}

/// Paths of the auth endpoints, relative to `base_url`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthEndpoints {
    pub login: String,
    pub signup: String,
    pub logout: String,
    pub refresh: String,
    pub change_password: String,
    pub delete_account: String,
    pub principal_summary: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// File holding the persisted credentials
    pub store_path: PathBuf,
    /// Namespace inside the credential file
    pub origin: String,
    pub unknown_expiry: UnknownExpiryPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 15,
            endpoints: AuthEndpoints::default(),
        }
    }
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: "/authentication/login".to_string(),
            signup: "/authentication/signup".to_string(),
            logout: "/auth/logout".to_string(),
            refresh: "/auth/refresh".to_string(),
            change_password: "/usuario/password".to_string(),
            delete_account: "/usuario/me".to_string(),
            principal_summary: "/usuario/nombre".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(".hcc/session.json"),
            origin: "http://localhost:8080".to_string(),
            unknown_expiry: UnknownExpiryPolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("HCC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.endpoints.login, "/authentication/login");
        assert_eq!(config.session.unknown_expiry, UnknownExpiryPolicy::Allow);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("api.base_url", "https://hcc.example/api")
            .unwrap()
            .set_override("session.unknown_expiry", "deny")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api.base_url, "https://hcc.example/api");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.api.endpoints.refresh, "/auth/refresh");
        assert_eq!(config.session.unknown_expiry, UnknownExpiryPolicy::Deny);
    }

    #[test]
    fn test_invalid_expiry_policy_is_rejected() {
        let result = config::Config::builder()
            .set_override("session.unknown_expiry", "dney")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>();

        assert!(result.is_err());
    }
}
