use elymica_auth::{DEFAULT_REFRESH_BUFFER_MS, needs_reauthentication, should_refresh};
use elymica_core::expires_at_from;

const SAMPLES: [i64; 9] = [
    i64::MIN,
    i64::MIN + 1,
    -3_600_000,
    -1,
    0,
    1,
    1_700_000_000_000,
    i64::MAX - 1,
    i64::MAX,
];

#[test]
fn test_should_refresh_matches_buffer_rule() {
    for now in SAMPLES {
        for expires_at in SAMPLES {
            for buffer in [0, 1, DEFAULT_REFRESH_BUFFER_MS, i64::MAX] {
                let expected =
                    i128::from(now) >= i128::from(expires_at) - i128::from(buffer);
                assert_eq!(
                    should_refresh(now, expires_at, buffer),
                    expected,
                    "now={} expires_at={} buffer={}",
                    now,
                    expires_at,
                    buffer
                );
            }
        }
    }
}

#[test]
fn test_refresh_window_opens_one_buffer_before_expiry() {
    let now = 1_700_000_000_000;
    let expires_at = expires_at_from(now, "3600");

    assert!(!should_refresh(now, expires_at, DEFAULT_REFRESH_BUFFER_MS));
    assert!(!should_refresh(
        expires_at - DEFAULT_REFRESH_BUFFER_MS - 1,
        expires_at,
        DEFAULT_REFRESH_BUFFER_MS
    ));
    assert!(should_refresh(
        expires_at - DEFAULT_REFRESH_BUFFER_MS,
        expires_at,
        DEFAULT_REFRESH_BUFFER_MS
    ));
    assert!(should_refresh(expires_at - 30_000, expires_at, DEFAULT_REFRESH_BUFFER_MS));
}

#[test]
fn test_reauthentication_only_without_refresh_token() {
    assert!(needs_reauthentication(false));
    assert!(!needs_reauthentication(true));
}
