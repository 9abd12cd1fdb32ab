//! HTTP client for the external Auth service.
//!
//! Each operation is one request/response exchange. Responses are parsed and
//! then validated; anything that does not match the expected shape is a
//! [`AuthError::SchemaViolation`] and never reaches the session.

use std::sync::Arc;

use elymica_config::AuthServiceConfig;
use elymica_core::now_millis;
use elymica_models::auth::ApiErrorBody;
use elymica_models::{
    AckResponse, Credential, LoginResponse, LogoutRequest, MeResponse, OtpCredential,
    OtpRequest, PasswordResetRequest, Principal, RefreshTokenRequest, RefreshTokenResponse,
    ResetPasswordRequest, TokenPair,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use validator::Validate;

use crate::error::AuthError;

/// Source of "now" in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub tokens: TokenPair,
    pub principal: Principal,
}

#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    clock: Clock,
}

impl AuthClient {
    pub fn new(config: &AuthServiceConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(http, config.base_url.clone()))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            clock: Arc::new(now_millis),
        }
    }

    /// Replaces the clock used to turn `expires_in` into an absolute expiry.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/auth/login`.
    #[instrument(skip(self, credential), fields(email = %credential.email, tenant = %credential.tenant_subdomain))]
    pub async fn login(&self, credential: &Credential) -> Result<SignedIn, AuthError> {
        self.sign_in("/api/auth/login", &credential.to_login_request()).await
    }

    /// `POST /api/auth/login-with-otp`. Answers exactly like [`login`](Self::login).
    #[instrument(skip(self, credential), fields(tenant = %credential.tenant_subdomain))]
    pub async fn login_with_otp(&self, credential: &OtpCredential) -> Result<SignedIn, AuthError> {
        self.sign_in("/api/auth/login-with-otp", &credential.to_login_request())
            .await
    }

    async fn sign_in<B: Serialize>(&self, path: &str, body: &B) -> Result<SignedIn, AuthError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::BAD_REQUEST
                | StatusCode::UNAUTHORIZED
                | StatusCode::FORBIDDEN
                | StatusCode::NOT_FOUND
                | StatusCode::UNPROCESSABLE_ENTITY => {
                    log_rejection(status, response).await;
                    AuthError::InvalidCredentials
                }
                other => AuthError::Network(format!("{} returned {}", path, other)),
            });
        }

        let body: LoginResponse = read_validated(response).await?;
        if !body.success {
            return Err(AuthError::InvalidCredentials);
        }

        let now = (self.clock)();
        debug!(user_id = %body.user.id, tenant_id = %body.tenant.id, "Login accepted");

        Ok(SignedIn {
            tokens: TokenPair::from_login(&body, now),
            principal: Principal::from_login(&body),
        })
    }

    /// `POST /api/auth/request-otp`. Sends a one-time code to `phone_number`.
    #[instrument(skip(self, phone_number), fields(tenant = %tenant_subdomain))]
    pub async fn request_otp(
        &self,
        phone_number: &str,
        tenant_subdomain: &str,
    ) -> Result<(), AuthError> {
        self.acknowledge(
            "/api/auth/request-otp",
            &OtpRequest {
                phone_number: phone_number.to_string(),
                tenant_subdomain: tenant_subdomain.to_string(),
            },
        )
        .await
    }

    /// `POST /api/auth/request-password-reset`.
    #[instrument(skip(self), fields(tenant = %tenant_subdomain))]
    pub async fn request_password_reset(
        &self,
        email: &str,
        tenant_subdomain: &str,
    ) -> Result<(), AuthError> {
        self.acknowledge(
            "/api/auth/request-password-reset",
            &PasswordResetRequest {
                email: email.to_string(),
                tenant_subdomain: tenant_subdomain.to_string(),
            },
        )
        .await
    }

    /// `POST /api/auth/reset-password`, redeeming a reset token.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        self.acknowledge(
            "/api/auth/reset-password",
            &ResetPasswordRequest {
                token: token.to_string(),
                new_password: new_password.to_string(),
            },
        )
        .await
    }

    /// Posts `body` to an endpoint that answers with an acknowledgement only.
    async fn acknowledge<B: Serialize>(&self, path: &str, body: &B) -> Result<(), AuthError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::BAD_REQUEST
                | StatusCode::UNAUTHORIZED
                | StatusCode::FORBIDDEN
                | StatusCode::NOT_FOUND
                | StatusCode::UNPROCESSABLE_ENTITY => {
                    let message = rejection_message(response).await;
                    warn!(status = %status.as_u16(), message = %message, "Auth service rejected request");
                    AuthError::Rejected(message)
                }
                other => AuthError::Network(format!("{} returned {}", path, other)),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let ack: AckResponse = parse_validated(&bytes)?;
        if !ack.success {
            return Err(AuthError::Rejected(
                ack.message.unwrap_or_else(|| "request was not accepted".to_string()),
            ));
        }
        Ok(())
    }

    /// `POST /api/auth/refresh`. The returned pair carries the rotated refresh
    /// token; the one presented here is no longer valid afterwards.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let response = self
            .http
            .post(self.url("/api/auth/refresh"))
            .json(&RefreshTokenRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    log_rejection(status, response).await;
                    AuthError::InvalidRefreshToken
                }
                other => AuthError::Network(format!("refresh returned {}", other)),
            });
        }

        let body: RefreshTokenResponse = read_validated(response).await?;
        if !body.success {
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok(TokenPair::from_refresh(&body, (self.clock)()))
    }

    /// `GET /api/auth/me`.
    #[instrument(skip_all)]
    pub async fn get_current_user(&self, access_token: &str) -> Result<Principal, AuthError> {
        let response = self
            .http
            .get(self.url("/api/auth/me"))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AuthError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AuthError::Network(format!("me returned {}", status)));
        }

        let body: MeResponse = read_validated(response).await?;
        if !body.success {
            return Err(AuthError::Unauthorized);
        }

        Principal::from_profile(body.user).ok_or_else(|| {
            AuthError::SchemaViolation("user is missing its tenant binding".to_string())
        })
    }

    /// `POST /api/auth/logout`, invalidating the refresh token server-side.
    #[instrument(skip_all)]
    pub async fn logout(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        let mut request = self.http.post(self.url("/api/auth/logout")).json(&LogoutRequest {
            refresh_token: refresh_token.map(str::to_string),
        });
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::Unauthorized),
            other => Err(AuthError::Network(format!("logout returned {}", other))),
        }
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

async fn read_validated<T>(response: reqwest::Response) -> Result<T, AuthError>
where
    T: DeserializeOwned + Validate,
{
    let bytes = response.bytes().await?;
    parse_validated(&bytes)
}

fn parse_validated<T>(bytes: &[u8]) -> Result<T, AuthError>
where
    T: DeserializeOwned + Validate,
{
    let body: T =
        serde_json::from_slice(bytes).map_err(|e| AuthError::SchemaViolation(e.to_string()))?;
    body.validate()
        .map_err(|e| AuthError::SchemaViolation(e.to_string()))?;
    Ok(body)
}

async fn rejection_message(response: reqwest::Response) -> String {
    response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message.or(body.error))
        .unwrap_or_else(|| "<none>".to_string())
}

async fn log_rejection(status: StatusCode, response: reqwest::Response) {
    let message = rejection_message(response).await;
    warn!(
        status = %status.as_u16(),
        message = %message,
        "Auth service rejected request"
    );
}
