use elymica_auth::{AuthError, SessionStore};
use elymica_core::AppError;
use elymica_models::Session;
use elymica_observability::{track_login_failure, track_login_success};
use tracing::{info, instrument, warn};
use validator::Validate;

use super::model::{
    NewPasswordRequest, OtpCodeRequest, PasswordResetEmailRequest, PortalLoginRequest,
    PortalOtpLoginRequest, resolve_tenant,
};

const INVALID_LOGIN: &str = "Invalid email or password";
const INVALID_OTP_LOGIN: &str = "Invalid phone number or code";
const INVALID_RESET: &str = "Reset link is invalid or has expired";

pub struct PortalAuthService;

impl PortalAuthService {
    /// Signs in through the Auth service. Every failure, whatever its cause,
    /// surfaces as the same `401`.
    #[instrument(skip(store))]
    pub async fn login(
        store: &SessionStore,
        dto: PortalLoginRequest,
        host_tenant: Option<String>,
    ) -> Result<Session, AppError> {
        let credential = dto.into_credential(host_tenant).ok_or_else(|| {
            track_login_failure("incomplete");
            AppError::unauthorized(INVALID_LOGIN)
        })?;

        if credential.validate().is_err() {
            track_login_failure("malformed");
            return Err(AppError::unauthorized(INVALID_LOGIN));
        }

        match store.sign_in(&credential).await {
            Ok(session) => {
                track_login_success(session.principal.role.as_str());
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Sign-in failed");
                track_login_failure(e.kind());
                Err(AppError::unauthorized(INVALID_LOGIN))
            }
        }
    }

    /// Signs in with a one-time code. Failures are as uniform as for
    /// [`login`](Self::login).
    #[instrument(skip(store))]
    pub async fn login_with_otp(
        store: &SessionStore,
        dto: PortalOtpLoginRequest,
        host_tenant: Option<String>,
    ) -> Result<Session, AppError> {
        let credential = dto.into_credential(host_tenant).ok_or_else(|| {
            track_login_failure("incomplete");
            AppError::unauthorized(INVALID_OTP_LOGIN)
        })?;

        if credential.validate().is_err() {
            track_login_failure("malformed");
            return Err(AppError::unauthorized(INVALID_OTP_LOGIN));
        }

        match store.sign_in_with_otp(&credential).await {
            Ok(session) => {
                track_login_success(session.principal.role.as_str());
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "OTP sign-in failed");
                track_login_failure(e.kind());
                Err(AppError::unauthorized(INVALID_OTP_LOGIN))
            }
        }
    }

    /// Asks the Auth service to text a sign-in code. A number the service
    /// does not know is answered like a known one.
    #[instrument(skip(store))]
    pub async fn request_otp(
        store: &SessionStore,
        dto: OtpCodeRequest,
        host_tenant: Option<String>,
    ) -> Result<(), AppError> {
        dto.validate().map_err(AppError::bad_request)?;
        let tenant = require_tenant(dto.tenant, host_tenant)?;

        let result = store
            .auth_client()
            .request_otp(&dto.phone_number, &tenant)
            .await;
        acknowledged(result, "OTP request")
    }

    /// Asks the Auth service to e-mail a reset link. Unknown addresses are
    /// answered like known ones.
    #[instrument(skip(store))]
    pub async fn request_password_reset(
        store: &SessionStore,
        dto: PasswordResetEmailRequest,
        host_tenant: Option<String>,
    ) -> Result<(), AppError> {
        dto.validate().map_err(AppError::bad_request)?;
        let tenant = require_tenant(dto.tenant, host_tenant)?;

        let result = store
            .auth_client()
            .request_password_reset(&dto.email, &tenant)
            .await;
        acknowledged(result, "Password reset request")
    }

    #[instrument(skip_all)]
    pub async fn reset_password(
        store: &SessionStore,
        dto: NewPasswordRequest,
    ) -> Result<(), AppError> {
        dto.validate().map_err(AppError::bad_request)?;

        match store
            .auth_client()
            .reset_password(&dto.token, &dto.new_password)
            .await
        {
            Ok(()) => {
                info!("Password reset completed");
                Ok(())
            }
            Err(e) if e.is_network_class() => {
                warn!(error = %e, "Password reset could not reach the Auth service");
                Err(AppError::bad_gateway(e))
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Password reset rejected");
                Err(AppError::bad_request(anyhow::anyhow!(INVALID_RESET)))
            }
        }
    }

    /// Best-effort: the local session is dropped even when the Auth service
    /// cannot be reached.
    #[instrument(skip_all, fields(user_id = %session.principal.user_id))]
    pub async fn logout(store: &SessionStore, session: &Session) {
        if let Err(e) = store.sign_out(session).await {
            warn!(error = %e, "Auth service logout failed");
        }
    }
}

fn require_tenant(explicit: Option<String>, host_tenant: Option<String>) -> Result<String, AppError> {
    resolve_tenant(explicit, host_tenant)
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Tenant is required")))
}

/// Rejections are swallowed so the answer does not reveal which accounts
/// exist. Only an unreachable Auth service is reported.
fn acknowledged(result: Result<(), AuthError>, operation: &str) -> Result<(), AppError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_network_class() => {
            warn!(error = %e, "{} could not reach the Auth service", operation);
            Err(AppError::bad_gateway(e))
        }
        Err(e) => {
            info!(kind = e.kind(), "{} rejected by the Auth service", operation);
            Ok(())
        }
    }
}
