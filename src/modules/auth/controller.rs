use axum::extract::{Query, State};
use axum::{Extension, Json};
use elymica_core::AppError;
use elymica_models::TenantContext;
use tracing::instrument;
use utoipa::ToSchema;

use super::model::{
    LoginPageQuery, LoginPageResponse, MessageResponse, NewPasswordRequest, OtpCodeRequest,
    PasswordResetEmailRequest, PortalLoginRequest, PortalOtpLoginRequest, SessionView,
};
use super::service::PortalAuthService;
use crate::middleware::session::CurrentSession;
use crate::state::AppState;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Sign in and start a session
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = PortalLoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SessionView),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, slot, tenant))]
pub async fn login(
    State(state): State<AppState>,
    CurrentSession(slot): CurrentSession,
    tenant: Option<Extension<TenantContext>>,
    Json(dto): Json<PortalLoginRequest>,
) -> Result<Json<SessionView>, AppError> {
    let host_tenant = tenant.map(|Extension(t)| t.subdomain);
    let session = PortalAuthService::login(&state.sessions, dto, host_tenant).await?;

    let view = SessionView::from(&session);
    slot.replace(Some(session));
    Ok(Json(view))
}

/// Text a one-time sign-in code
#[utoipa::path(
    post,
    path = "/api/auth/otp/request",
    request_body = OtpCodeRequest,
    responses(
        (status = 200, description = "Code sent if the number is registered", body = MessageResponse),
        (status = 400, description = "Malformed phone number or no tenant", body = ErrorResponse),
        (status = 502, description = "Auth service unreachable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, tenant))]
pub async fn request_otp(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
    Json(dto): Json<OtpCodeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let host_tenant = tenant.map(|Extension(t)| t.subdomain);
    PortalAuthService::request_otp(&state.sessions, dto, host_tenant).await?;

    Ok(Json(MessageResponse {
        message: "If the number is registered, a code has been sent".to_string(),
    }))
}

/// Sign in with a one-time code and start a session
#[utoipa::path(
    post,
    path = "/api/auth/otp/login",
    request_body = PortalOtpLoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SessionView),
        (status = 401, description = "Invalid phone number or code", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, slot, tenant))]
pub async fn login_with_otp(
    State(state): State<AppState>,
    CurrentSession(slot): CurrentSession,
    tenant: Option<Extension<TenantContext>>,
    Json(dto): Json<PortalOtpLoginRequest>,
) -> Result<Json<SessionView>, AppError> {
    let host_tenant = tenant.map(|Extension(t)| t.subdomain);
    let session = PortalAuthService::login_with_otp(&state.sessions, dto, host_tenant).await?;

    let view = SessionView::from(&session);
    slot.replace(Some(session));
    Ok(Json(view))
}

/// E-mail a password reset link
#[utoipa::path(
    post,
    path = "/api/auth/password-reset/request",
    request_body = PasswordResetEmailRequest,
    responses(
        (status = 200, description = "Link sent if the account exists", body = MessageResponse),
        (status = 400, description = "Malformed e-mail or no tenant", body = ErrorResponse),
        (status = 502, description = "Auth service unreachable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, tenant))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
    Json(dto): Json<PasswordResetEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let host_tenant = tenant.map(|Extension(t)| t.subdomain);
    PortalAuthService::request_password_reset(&state.sessions, dto, host_tenant).await?;

    Ok(Json(MessageResponse {
        message: "If the account exists, a reset link has been sent".to_string(),
    }))
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/api/auth/password-reset",
    request_body = NewPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Token invalid or expired, or password too short", body = ErrorResponse),
        (status = 502, description = "Auth service unreachable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(dto): Json<NewPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    PortalAuthService::reset_password(&state.sessions, dto).await?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}

/// Current session, or `null`
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session view, null when signed out", body = SessionView)
    ),
    tag = "Authentication"
)]
pub async fn get_session(CurrentSession(slot): CurrentSession) -> Json<Option<SessionView>> {
    Json(slot.snapshot().as_ref().map(SessionView::from))
}

/// Sign out and clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(slot): CurrentSession,
) -> Json<MessageResponse> {
    if let Some(session) = slot.snapshot() {
        PortalAuthService::logout(&state.sessions, &session).await;
    }
    slot.replace(None);

    Json(MessageResponse {
        message: "Signed out".to_string(),
    })
}

/// Login page data
#[utoipa::path(
    get,
    path = "/login",
    params(LoginPageQuery),
    responses(
        (status = 200, description = "Where to return after signing in", body = LoginPageResponse)
    ),
    tag = "Authentication"
)]
pub async fn login_page(
    Query(query): Query<LoginPageQuery>,
    tenant: Option<Extension<TenantContext>>,
) -> Json<LoginPageResponse> {
    Json(LoginPageResponse {
        callback_url: query.callback_url,
        tenant: tenant.map(|Extension(t)| t.subdomain),
    })
}
