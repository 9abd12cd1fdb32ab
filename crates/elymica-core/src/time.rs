//! Epoch-millisecond time helpers.

use chrono::Utc;

/// Lifetime assumed when the Auth service's `expires_in` cannot be parsed.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Absolute expiry for a server-declared `expires_in` (seconds, as a string).
///
/// Falls back to [`DEFAULT_EXPIRES_IN_SECS`] when the value is not an integer.
pub fn expires_at_from(now_ms: i64, expires_in: &str) -> i64 {
    let seconds = expires_in
        .trim()
        .parse::<i64>()
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    now_ms.saturating_add(seconds.saturating_mul(1000))
}
