use elymica_models::{Credential, OtpCredential, Role, Session, SessionError};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// The tenant named in a form, or else the tenant of the request host.
pub fn resolve_tenant(explicit: Option<String>, host_tenant: Option<String>) -> Option<String> {
    explicit.filter(|t| !t.trim().is_empty()).or(host_tenant)
}

/// Portal sign-in form. Every field is optional on the wire; incomplete
/// submissions are rejected the same way as wrong credentials.
#[derive(Deserialize, ToSchema)]
pub struct PortalLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Tenant subdomain. Defaults to the tenant of the request host.
    pub tenant: Option<String>,
}

impl PortalLoginRequest {
    pub fn into_credential(self, host_tenant: Option<String>) -> Option<Credential> {
        let tenant = resolve_tenant(self.tenant, host_tenant)?;
        Some(Credential::new(self.email?, self.password?, tenant))
    }
}

impl std::fmt::Debug for PortalLoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalLoginRequest")
            .field("email", &self.email)
            .field("tenant", &self.tenant)
            .finish()
    }
}

/// Passwordless sign-in form. Incomplete submissions fail like a wrong code.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalOtpLoginRequest {
    pub phone_number: Option<String>,
    pub otp: Option<String>,
    pub tenant: Option<String>,
}

impl PortalOtpLoginRequest {
    pub fn into_credential(self, host_tenant: Option<String>) -> Option<OtpCredential> {
        let tenant = resolve_tenant(self.tenant, host_tenant)?;
        Some(OtpCredential::new(self.phone_number?, self.otp?, tenant))
    }
}

impl std::fmt::Debug for PortalOtpLoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalOtpLoginRequest")
            .field("phone_number", &self.phone_number)
            .field("tenant", &self.tenant)
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OtpCodeRequest {
    #[validate(length(min = 7, max = 20))]
    pub phone_number: String,
    pub tenant: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PasswordResetEmailRequest {
    #[validate(email)]
    pub email: String,
    pub tenant: Option<String>,
}

/// Redeems the token from a reset e-mail.
#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

impl std::fmt::Debug for NewPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewPasswordRequest").finish_non_exhaustive()
    }
}

/// What the browser sees of its session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub tenant_id: Uuid,
    pub tenant_subdomain: String,
    pub access_token: String,
    pub expires_at: i64,
    pub error: Option<SessionError>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.principal.user_id,
            email: session.principal.email.clone(),
            name: session.principal.name.clone(),
            role: session.principal.role,
            tenant_id: session.principal.tenant_id,
            tenant_subdomain: session.principal.tenant_subdomain.clone(),
            access_token: session.tokens.access_token.clone(),
            expires_at: session.tokens.expires_at,
            error: session.error,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LoginPageQuery {
    /// Where to go after signing in.
    pub callback_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPageResponse {
    pub callback_url: Option<String>,
    pub tenant: Option<String>,
}
