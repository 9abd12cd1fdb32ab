use std::env;
use std::time::Duration;

use crate::env::parse_or;

/// Session cookie and refresh timing configuration.
///
/// # Environment Variables
///
/// - `SESSION_SECRET`: HMAC key used to sign the encoded session
/// - `SESSION_COOKIE_NAME` (default: `elymica.session-token`)
/// - `SESSION_MAX_AGE_SECS` (default: 30 days)
/// - `SESSION_COOKIE_SECURE` (default: `false`)
/// - `REFRESH_BUFFER_SECS`: proactive refresh lead time (default: `60`)
/// - `REFRESH_GRACE_SECS`: how long a completed rotation is shared with late
///   callers presenting the same refresh token (default: `10`)
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub secret: String,
    pub cookie_name: String,
    pub max_age: Duration,
    pub cookie_secure: bool,
    pub refresh_buffer: Duration,
    pub refresh_grace: Duration,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("SESSION_SECRET")
                .or_else(|_| env::var("NEXTAUTH_SECRET"))
                .unwrap_or_else(|_| "your-session-secret-change-in-production".to_string()),
            cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "elymica.session-token".to_string()),
            max_age: Duration::from_secs(parse_or("SESSION_MAX_AGE_SECS", 30 * 24 * 60 * 60)),
            cookie_secure: parse_or("SESSION_COOKIE_SECURE", false),
            refresh_buffer: Duration::from_secs(parse_or("REFRESH_BUFFER_SECS", 60)),
            refresh_grace: Duration::from_secs(parse_or("REFRESH_GRACE_SECS", 10)),
        }
    }

    /// Refresh lead time in milliseconds, as consumed by the decision engine.
    pub fn refresh_buffer_ms(&self) -> i64 {
        self.refresh_buffer.as_millis() as i64
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: "your-session-secret-change-in-production".to_string(),
            cookie_name: "elymica.session-token".to_string(),
            max_age: Duration::from_secs(30 * 24 * 60 * 60),
            cookie_secure: false,
            refresh_buffer: Duration::from_secs(60),
            refresh_grace: Duration::from_secs(10),
        }
    }
}
