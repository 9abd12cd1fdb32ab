//! Refresh decisions.
//!
//! Sessions are not kept resident: they are decoded on every request, so these
//! checks run once per materialization.

/// Lead time before expiry at which a session is renewed.
pub const DEFAULT_REFRESH_BUFFER_MS: i64 = 60_000;

/// `true` once `now` has entered the buffer window before `expires_at`.
///
/// Exactly `now >= expires_at - buffer`, evaluated without overflow.
pub fn should_refresh(now_ms: i64, expires_at_ms: i64, buffer_ms: i64) -> bool {
    i128::from(now_ms) >= i128::from(expires_at_ms) - i128::from(buffer_ms)
}

/// A session without a refresh token can only be renewed by signing in again.
pub fn needs_reauthentication(has_refresh_token: bool) -> bool {
    !has_refresh_token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_refresh_outside_buffer() {
        let expires_at = 10_000_000;
        assert!(!should_refresh(
            expires_at - 120_000,
            expires_at,
            DEFAULT_REFRESH_BUFFER_MS
        ));
    }

    #[test]
    fn test_should_refresh_inside_buffer() {
        let expires_at = 10_000_000;
        assert!(should_refresh(
            expires_at - 30_000,
            expires_at,
            DEFAULT_REFRESH_BUFFER_MS
        ));
    }

    #[test]
    fn test_should_refresh_at_buffer_boundary() {
        let expires_at = 10_000_000;
        assert!(should_refresh(
            expires_at - DEFAULT_REFRESH_BUFFER_MS,
            expires_at,
            DEFAULT_REFRESH_BUFFER_MS
        ));
        assert!(!should_refresh(
            expires_at - DEFAULT_REFRESH_BUFFER_MS - 1,
            expires_at,
            DEFAULT_REFRESH_BUFFER_MS
        ));
    }

    #[test]
    fn test_should_refresh_after_expiry() {
        assert!(should_refresh(20_000, 10_000, DEFAULT_REFRESH_BUFFER_MS));
    }

    #[test]
    fn test_should_refresh_extreme_values() {
        assert!(should_refresh(i64::MIN, i64::MIN, 0));
        assert!(should_refresh(0, i64::MIN, i64::MAX));
        assert!(!should_refresh(i64::MAX - 1, i64::MAX, 0));
        assert!(!should_refresh(i64::MAX, i64::MAX, -1));
    }

    #[test]
    fn test_needs_reauthentication() {
        assert!(needs_reauthentication(false));
        assert!(!needs_reauthentication(true));
    }
}
