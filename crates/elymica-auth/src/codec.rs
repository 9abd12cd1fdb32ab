//! Signed session encoding.
//!
//! The session travels between requests as an HS256 JWT (normally inside a
//! cookie). The payload is signed, not encrypted. Decoding is all-or-nothing:
//! a bad signature, an expired envelope, or a payload missing any field yields
//! no session at all.

use std::time::Duration;

use elymica_config::SessionConfig;
use elymica_models::{Principal, Role, Session, SessionError, TokenPair};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionClaims {
    user_id: Uuid,
    email: String,
    name: String,
    role: Role,
    tenant_id: Uuid,
    tenant_subdomain: String,
    access_token: String,
    refresh_token: Option<String>,
    token_type: String,
    expires_at: i64,
    error: Option<SessionError>,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    max_age: Duration,
}

impl SessionCodec {
    pub fn new(secret: &str, max_age: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            max_age,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.secret, config.max_age)
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Encodes `session`; the envelope stays valid for `max_age` from `now_ms`.
    pub fn encode(
        &self,
        session: &Session,
        now_ms: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = now_ms / 1000;
        let claims = SessionClaims {
            user_id: session.principal.user_id,
            email: session.principal.email.clone(),
            name: session.principal.name.clone(),
            role: session.principal.role,
            tenant_id: session.principal.tenant_id,
            tenant_subdomain: session.principal.tenant_subdomain.clone(),
            access_token: session.tokens.access_token.clone(),
            refresh_token: session.tokens.refresh_token.clone(),
            token_type: session.tokens.token_type.clone(),
            expires_at: session.tokens.expires_at,
            error: session.error,
            iat,
            exp: iat + self.max_age.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn decode(&self, token: &str) -> Option<Session> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| debug!(error = %e, "Discarding undecodable session"))
            .ok()?;

        Some(Session {
            tokens: TokenPair {
                access_token: claims.access_token,
                refresh_token: claims.refresh_token,
                expires_at: claims.expires_at,
                token_type: claims.token_type,
            },
            principal: Principal {
                user_id: claims.user_id,
                email: claims.email,
                name: claims.name,
                role: claims.role,
                tenant_id: claims.tenant_id,
                tenant_subdomain: claims.tenant_subdomain,
            },
            error: claims.error,
        })
    }
}
