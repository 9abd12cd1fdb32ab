//! # Elymica Models
//!
//! Data structures shared across the session subsystem:
//!
//! - [`auth`]: request/response shapes of the external Auth service, with the
//!   `validator` rules that make parsing fail closed
//! - [`session`]: [`Credential`], [`TokenPair`], [`Principal`] and [`Session`]
//! - [`tenant`]: request-scoped [`TenantContext`] derived from the host name
//! - [`role`]: portal user roles

pub mod auth;
pub mod role;
pub mod session;
pub mod tenant;

pub use auth::{
    AckResponse, LoginRequest, LoginResponse, LogoutRequest, MeResponse, OtpLoginRequest,
    OtpRequest, PasswordResetRequest, RefreshTokenRequest, RefreshTokenResponse,
    ResetPasswordRequest, TenantInfo, UserProfile,
};
pub use role::Role;
pub use session::{Credential, OtpCredential, Principal, Session, SessionError, SessionState, TokenPair};
pub use tenant::{TENANT_HEADER, TenantContext};
