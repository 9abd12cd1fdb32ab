use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    LoginPageResponse, MessageResponse, NewPasswordRequest, OtpCodeRequest,
    PasswordResetEmailRequest, PortalLoginRequest, PortalOtpLoginRequest, SessionView,
};
use crate::modules::portal::model::{DashboardResponse, HealthResponse};
use elymica_models::{Role, SessionError};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::get_session,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::request_otp,
        crate::modules::auth::controller::login_with_otp,
        crate::modules::auth::controller::request_password_reset,
        crate::modules::auth::controller::reset_password,
        crate::modules::auth::controller::login_page,
        crate::modules::portal::controller::dashboard,
        crate::modules::portal::controller::forward_to_service,
        crate::modules::portal::controller::health,
    ),
    components(
        schemas(
            PortalLoginRequest,
            PortalOtpLoginRequest,
            OtpCodeRequest,
            PasswordResetEmailRequest,
            NewPasswordRequest,
            SessionView,
            MessageResponse,
            LoginPageResponse,
            ErrorResponse,
            DashboardResponse,
            HealthResponse,
            Role,
            SessionError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Portal sign-in and session endpoints"),
        (name = "Portal", description = "Protected portal endpoints")
    ),
    info(
        title = "Elymica Portal",
        version = "0.1.0",
        description = "Session and credential lifecycle for the multi-tenant Elymica portals.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("elymica.session-token"))),
            )
        }
    }
}
