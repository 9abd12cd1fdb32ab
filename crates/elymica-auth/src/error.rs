use thiserror::Error;

/// Failures of the Auth service exchange.
///
/// `Network` and `SchemaViolation` form the network class: the call did not
/// produce a trustworthy answer and is surfaced as a request failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Refresh token is invalid or has already been used")]
    InvalidRefreshToken,

    #[error("Access token was rejected")]
    Unauthorized,

    /// The Auth service refused a one-time code or reset request.
    #[error("Auth service rejected the request: {0}")]
    Rejected(String),

    #[error("Auth service request failed: {0}")]
    Network(String),

    #[error("Auth service returned an unexpected payload: {0}")]
    SchemaViolation(String),
}

impl AuthError {
    pub fn is_network_class(&self) -> bool {
        matches!(self, AuthError::Network(_) | AuthError::SchemaViolation(_))
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidRefreshToken => "invalid_refresh_token",
            AuthError::Unauthorized => "unauthorized",
            AuthError::Rejected(_) => "rejected",
            AuthError::Network(_) => "network",
            AuthError::SchemaViolation(_) => "schema_violation",
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Network("request timed out".to_string())
        } else {
            AuthError::Network(err.to_string())
        }
    }
}
