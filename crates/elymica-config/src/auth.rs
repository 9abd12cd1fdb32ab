use std::env;
use std::time::Duration;

use crate::env::{parse_or, trim_base_url};

/// Location of the external Auth service.
///
/// # Environment Variables
///
/// - `AUTH_SERVICE_BASE_URL`, falling back to `NEXT_PUBLIC_API_BASE_URL`
///   (default: `https://auth.elymica.com`)
/// - `AUTH_TIMEOUT_SECS`: per-request timeout (default: `10`)
#[derive(Clone, Debug)]
pub struct AuthServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl AuthServiceConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("AUTH_SERVICE_BASE_URL")
            .or_else(|_| env::var("NEXT_PUBLIC_API_BASE_URL"))
            .unwrap_or_else(|_| "https://auth.elymica.com".to_string());

        Self {
            base_url: trim_base_url(base_url),
            timeout: Duration::from_secs(parse_or("AUTH_TIMEOUT_SECS", 10)),
        }
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = AuthServiceConfig::new("http://auth.local/");
        assert_eq!(config.base_url, "http://auth.local");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
