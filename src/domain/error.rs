use thiserror::Error;

/// Discriminant of an [`AuthError`], used where callers only need the category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailureKind {
    InvalidCredentials,
    ServerError,
    Timeout,
    Conflict,
    Unauthenticated,
    MalformedToken,
    Unknown,
    Configuration,
}

/// Session and authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    #[error("Server error: {message}")]
    ServerError { message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("No authenticated session")]
    Unauthenticated,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Unexpected error: {message}")]
    Unknown { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Shown for transient failures instead of the underlying detail
pub const GENERIC_FAILURE_MESSAGE: &str =
    "The service is temporarily unavailable. Please try again later.";

/// Shown when the backend rejects credentials without a message of its own
pub const DEFAULT_CREDENTIALS_MESSAGE: &str = "Authentication error";

impl AuthError {
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::ServerError {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> AuthFailureKind {
        match self {
            Self::InvalidCredentials { .. } => AuthFailureKind::InvalidCredentials,
            Self::ServerError { .. } => AuthFailureKind::ServerError,
            Self::Timeout => AuthFailureKind::Timeout,
            Self::Conflict { .. } => AuthFailureKind::Conflict,
            Self::Unauthenticated => AuthFailureKind::Unauthenticated,
            Self::MalformedToken => AuthFailureKind::MalformedToken,
            Self::Unknown { .. } => AuthFailureKind::Unknown,
            Self::Configuration { .. } => AuthFailureKind::Configuration,
        }
    }

    /// Text that is safe to display to the end user.
    ///
    /// Credential and conflict messages come from the backend and are shown
    /// verbatim; transient failures never leak their detail.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials { message } | Self::Conflict { message } => message.clone(),
            Self::ServerError { .. } | Self::Timeout | Self::Unknown { .. } => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            Self::Unauthenticated | Self::MalformedToken => {
                "Your session has ended. Please sign in again.".to_string()
            }
            Self::Configuration { message } => message.clone(),
        }
    }
}
