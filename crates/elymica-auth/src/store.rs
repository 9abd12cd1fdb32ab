//! Session state machine.
//!
//! ```text
//!  Anonymous ──sign_in──▶ Authenticated ──(not due)──▶ Authenticated
//!                              │
//!                              ├─(due, rotated)──────▶ Authenticated'
//!                              ├─(due, no token)─────▶ Error{RefreshTokenMissing}
//!                              └─(due, refresh fails)▶ Error{RefreshAccessTokenError}
//!  Error ──sign_in──▶ Authenticated
//! ```
//!
//! Materialization runs once per request on a working copy of the decoded
//! session. There is no retry loop: a failed refresh is recorded on the session
//! and the stale token pair is kept until the user signs in again.

use std::sync::Arc;

use elymica_config::SessionConfig;
use elymica_models::{Credential, OtpCredential, Session, SessionError};
use elymica_observability::{
    RefreshOutcome, RefreshTrigger, track_session_error, track_token_refresh,
};
use tracing::{info, instrument, warn};

use crate::client::{AuthClient, SignedIn};
use crate::codec::SessionCodec;
use crate::coordinator::RefreshCoordinator;
use crate::error::AuthError;
use crate::refresh::{needs_reauthentication, should_refresh};

pub struct SessionStore {
    auth: Arc<AuthClient>,
    coordinator: Arc<RefreshCoordinator>,
    codec: SessionCodec,
    refresh_buffer_ms: i64,
}

impl SessionStore {
    pub fn new(
        auth: Arc<AuthClient>,
        coordinator: Arc<RefreshCoordinator>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            auth,
            coordinator,
            codec: SessionCodec::from_config(config),
            refresh_buffer_ms: config.refresh_buffer_ms(),
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn auth_client(&self) -> &Arc<AuthClient> {
        &self.auth
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// `Anonymous|Error → Authenticated`. The new session replaces whatever
    /// state the caller held before.
    #[instrument(skip(self, credential), fields(tenant = %credential.tenant_subdomain))]
    pub async fn sign_in(&self, credential: &Credential) -> Result<Session, AuthError> {
        let signed_in = self.auth.login(credential).await?;
        Ok(establish(signed_in))
    }

    /// Passwordless `Anonymous|Error → Authenticated`, with a one-time code.
    #[instrument(skip(self, credential), fields(tenant = %credential.tenant_subdomain))]
    pub async fn sign_in_with_otp(&self, credential: &OtpCredential) -> Result<Session, AuthError> {
        let signed_in = self.auth.login_with_otp(credential).await?;
        Ok(establish(signed_in))
    }

    /// Runs one step of the state machine on `session` at `now_ms`.
    #[instrument(skip_all, fields(user_id = %session.principal.user_id))]
    pub async fn materialize(&self, mut session: Session, now_ms: i64) -> Session {
        if session.error.is_some() {
            return session;
        }

        if !should_refresh(now_ms, session.tokens.expires_at, self.refresh_buffer_ms) {
            return session;
        }

        let refresh_token = match session.tokens.refresh_token.clone() {
            Some(token) if !needs_reauthentication(!token.is_empty()) => token,
            _ => {
                warn!("Refresh due but session holds no refresh token");
                track_token_refresh(RefreshTrigger::Proactive, RefreshOutcome::MissingToken);
                return fail(session, SessionError::RefreshTokenMissing);
            }
        };

        match self.coordinator.refresh(&refresh_token).await {
            Ok(rotation) => {
                let outcome = if rotation.shared {
                    RefreshOutcome::Shared
                } else {
                    RefreshOutcome::Rotated
                };
                track_token_refresh(RefreshTrigger::Proactive, outcome);
                session.tokens = rotation.tokens;
                session.error = None;
                session
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Failed to refresh access token");
                track_token_refresh(RefreshTrigger::Proactive, RefreshOutcome::Failed);
                fail(session, SessionError::RefreshAccessTokenError)
            }
        }
    }

    /// Decodes an encoded session and materializes it. `None` means anonymous.
    pub async fn load(&self, encoded: Option<&str>, now_ms: i64) -> Option<Session> {
        let session = self.codec.decode(encoded?)?;
        Some(self.materialize(session, now_ms).await)
    }

    /// Invalidates the session's refresh token at the Auth service.
    pub async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        self.auth
            .logout(
                Some(&session.tokens.access_token),
                session.tokens.refresh_token.as_deref(),
            )
            .await
    }
}

fn establish(signed_in: SignedIn) -> Session {
    info!(
        user_id = %signed_in.principal.user_id,
        role = %signed_in.principal.role,
        "Session established"
    );
    Session::new(signed_in.tokens, signed_in.principal)
}

fn fail(mut session: Session, error: SessionError) -> Session {
    track_session_error(error.as_str());
    session.error = Some(error);
    session
}
