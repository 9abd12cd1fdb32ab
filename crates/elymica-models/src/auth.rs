//! Auth service wire models.
//!
//! Every response type derives both `Deserialize` and `Validate`. A response is
//! only trusted once both succeed; a body that parses but breaks a rule (bad
//! e-mail, empty token, non-`Bearer` token type) is rejected as a whole.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::role::Role;

fn default_success() -> bool {
    true
}

fn validate_bearer(token_type: &str) -> Result<(), ValidationError> {
    if token_type == "Bearer" {
        Ok(())
    } else {
        Err(ValidationError::new("token_type_not_bearer"))
    }
}

/// `POST /api/auth/login` body.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub tenant_subdomain: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("tenant_subdomain", &self.tenant_subdomain)
            .finish()
    }
}

/// User record embedded in login and `/me` responses.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserProfile {
    pub id: Uuid,
    #[validate(email)]
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub tenant_subdomain: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

/// Tenant (school) the user signed into.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TenantInfo {
    pub id: Uuid,
    #[validate(length(min = 1))]
    pub subdomain: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /api/auth/login` response.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[validate(length(min = 1))]
    pub access_token: String,
    #[validate(length(min = 1))]
    pub refresh_token: String,
    #[validate(custom(function = "validate_bearer"))]
    pub token_type: String,
    /// Lifetime in seconds, sent as a string.
    pub expires_in: String,
    #[validate(nested)]
    pub user: UserProfile,
    #[validate(nested)]
    pub tenant: TenantInfo,
}

/// `POST /api/auth/refresh` body.
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// `POST /api/auth/refresh` response. The refresh token is always rotated.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[validate(length(min = 1))]
    pub access_token: String,
    #[validate(length(min = 1))]
    pub refresh_token: String,
    #[serde(default)]
    #[validate(custom(function = "validate_bearer"))]
    pub token_type: Option<String>,
    pub expires_in: String,
}

/// `GET /api/auth/me` response.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MeResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[validate(nested)]
    pub user: UserProfile,
}

/// `POST /api/auth/logout` body.
#[derive(Clone, Serialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// `POST /api/auth/login-with-otp` body.
#[derive(Clone, Serialize)]
pub struct OtpLoginRequest {
    pub phone_number: String,
    pub otp: String,
    pub tenant_subdomain: String,
}

impl std::fmt::Debug for OtpLoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpLoginRequest")
            .field("phone_number", &self.phone_number)
            .field("otp", &"<redacted>")
            .field("tenant_subdomain", &self.tenant_subdomain)
            .finish()
    }
}

/// `POST /api/auth/request-otp` body.
#[derive(Debug, Clone, Serialize)]
pub struct OtpRequest {
    pub phone_number: String,
    pub tenant_subdomain: String,
}

/// `POST /api/auth/request-password-reset` body.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
    pub tenant_subdomain: String,
}

/// `POST /api/auth/reset-password` body.
#[derive(Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

impl std::fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("token", &"<redacted>")
            .field("new_password", &"<redacted>")
            .finish()
    }
}

/// Acknowledgement returned by the endpoints that carry no payload. An empty
/// body counts as an acknowledgement too.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AckResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error envelope returned by the backend services.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}
