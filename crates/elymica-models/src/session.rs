//! Session domain types.
//!
//! A [`Session`] is the only state that survives between requests. It is either
//! fully populated or absent: there is no constructor for a session without a
//! token pair and a principal.

use std::fmt;

use elymica_core::expires_at_from;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    LoginRequest, LoginResponse, OtpLoginRequest, RefreshTokenResponse, UserProfile,
};
use crate::role::Role;

/// Sign-in input. Never persisted.
#[derive(Clone, Deserialize, Validate)]
pub struct Credential {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub tenant_subdomain: String,
}

impl Credential {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        tenant_subdomain: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            tenant_subdomain: tenant_subdomain.into(),
        }
    }

    pub fn to_login_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
            tenant_subdomain: self.tenant_subdomain.clone(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("tenant_subdomain", &self.tenant_subdomain)
            .finish()
    }
}

/// Passwordless sign-in input: a one-time code sent to the user's phone.
#[derive(Clone, Deserialize, Validate)]
pub struct OtpCredential {
    #[validate(length(min = 7, max = 20))]
    pub phone_number: String,
    #[validate(length(min = 4, max = 8))]
    pub otp: String,
    #[validate(length(min = 1))]
    pub tenant_subdomain: String,
}

impl OtpCredential {
    pub fn new(
        phone_number: impl Into<String>,
        otp: impl Into<String>,
        tenant_subdomain: impl Into<String>,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            otp: otp.into(),
            tenant_subdomain: tenant_subdomain.into(),
        }
    }

    pub fn to_login_request(&self) -> OtpLoginRequest {
        OtpLoginRequest {
            phone_number: self.phone_number.clone(),
            otp: self.otp.clone(),
            tenant_subdomain: self.tenant_subdomain.clone(),
        }
    }
}

impl fmt::Debug for OtpCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpCredential")
            .field("phone_number", &self.phone_number)
            .field("otp", &"<redacted>")
            .field("tenant_subdomain", &self.tenant_subdomain)
            .finish()
    }
}

/// Access/refresh token pair. Replaced wholesale on login and refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Absolute expiry of the access token, epoch milliseconds.
    pub expires_at: i64,
    pub token_type: String,
}

impl TokenPair {
    pub fn from_login(response: &LoginResponse, now_ms: i64) -> Self {
        Self {
            access_token: response.access_token.clone(),
            refresh_token: Some(response.refresh_token.clone()),
            expires_at: expires_at_from(now_ms, &response.expires_in),
            token_type: response.token_type.clone(),
        }
    }

    pub fn from_refresh(response: &RefreshTokenResponse, now_ms: i64) -> Self {
        Self {
            access_token: response.access_token.clone(),
            refresh_token: Some(response.refresh_token.clone()),
            expires_at: expires_at_from(now_ms, &response.expires_in),
            token_type: response
                .token_type
                .clone()
                .unwrap_or_else(|| "Bearer".to_string()),
        }
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.has_refresh_token())
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// The authenticated user, bound to a token pair at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub tenant_id: Uuid,
    pub tenant_subdomain: String,
}

impl Principal {
    pub fn from_login(response: &LoginResponse) -> Self {
        Self {
            user_id: response.user.id,
            email: response.user.email.clone(),
            name: response.user.name.clone(),
            role: response.user.role,
            tenant_id: response.tenant.id,
            tenant_subdomain: response.tenant.subdomain.clone(),
        }
    }

    /// Builds a principal from a `/me` profile. Fails when the profile does not
    /// carry its tenant binding.
    pub fn from_profile(profile: UserProfile) -> Option<Self> {
        Some(Self {
            user_id: profile.id,
            email: profile.email,
            name: profile.name,
            role: profile.role,
            tenant_id: profile.tenant_id?,
            tenant_subdomain: profile.tenant_subdomain.filter(|s| !s.is_empty())?,
        })
    }
}

/// Refresh failure recorded on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SessionError {
    RefreshTokenMissing,
    RefreshAccessTokenError,
}

impl SessionError {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionError::RefreshTokenMissing => "RefreshTokenMissing",
            SessionError::RefreshAccessTokenError => "RefreshAccessTokenError",
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub tokens: TokenPair,
    pub principal: Principal,
    pub error: Option<SessionError>,
}

impl Session {
    pub fn new(tokens: TokenPair, principal: Principal) -> Self {
        Self {
            tokens,
            principal,
            error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.error {
            Some(error) => SessionState::Error(error),
            None => SessionState::Authenticated,
        }
    }
}

/// Observable state of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Error(SessionError),
}

impl SessionState {
    pub fn of(session: Option<&Session>) -> Self {
        session.map_or(SessionState::Anonymous, Session::state)
    }
}
