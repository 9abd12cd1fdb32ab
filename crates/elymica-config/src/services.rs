use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::env::{parse_or, trim_base_url};

/// Backend microservices reachable through the API gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Auth,
    Lms,
    Notifications,
    Assignments,
    Grading,
    Enrollment,
    Analytics,
    Content,
}

impl Service {
    pub const ALL: [Service; 8] = [
        Service::Auth,
        Service::Lms,
        Service::Notifications,
        Service::Assignments,
        Service::Grading,
        Service::Enrollment,
        Service::Analytics,
        Service::Content,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Auth => "auth",
            Service::Lms => "lms",
            Service::Notifications => "notifications",
            Service::Assignments => "assignments",
            Service::Grading => "grading",
            Service::Enrollment => "enrollment",
            Service::Analytics => "analytics",
            Service::Content => "content",
        }
    }

    fn env_key(&self) -> &'static str {
        match self {
            Service::Auth => "AUTH_SERVICE_BASE_URL",
            Service::Lms => "LMS_SERVICE_URL",
            Service::Notifications => "NOTIFICATION_SERVICE_URL",
            Service::Assignments => "ASSIGNMENT_SERVICE_URL",
            Service::Grading => "GRADING_SERVICE_URL",
            Service::Enrollment => "ENROLLMENT_SERVICE_URL",
            Service::Analytics => "ANALYTICS_SERVICE_URL",
            Service::Content => "CONTENT_SERVICE_URL",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown service: {}", s))
    }
}

/// Base URLs of the backend services.
///
/// Every service defaults to `API_BASE_URL` (fallback `NEXT_PUBLIC_API_BASE_URL`,
/// default `https://api.elymica.com`) unless its own variable is set, e.g.
/// `LMS_SERVICE_URL`. `API_TIMEOUT_SECS` bounds each outbound call (default `10`).
#[derive(Clone, Debug)]
pub struct ServiceEndpoints {
    pub default_base_url: String,
    pub overrides: HashMap<Service, String>,
    pub timeout: Duration,
}

impl ServiceEndpoints {
    pub fn from_env() -> Self {
        let default_base_url = env::var("API_BASE_URL")
            .or_else(|_| env::var("NEXT_PUBLIC_API_BASE_URL"))
            .unwrap_or_else(|_| "https://api.elymica.com".to_string());

        let overrides = Service::ALL
            .iter()
            .filter_map(|service| {
                env::var(service.env_key())
                    .ok()
                    .map(|url| (*service, trim_base_url(url)))
            })
            .collect();

        Self {
            default_base_url: trim_base_url(default_base_url),
            overrides,
            timeout: Duration::from_secs(parse_or("API_TIMEOUT_SECS", 10)),
        }
    }

    pub fn new(default_base_url: impl Into<String>) -> Self {
        Self {
            default_base_url: trim_base_url(default_base_url.into()),
            overrides: HashMap::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_override(mut self, service: Service, base_url: impl Into<String>) -> Self {
        self.overrides
            .insert(service, trim_base_url(base_url.into()));
        self
    }

    pub fn base_url(&self, service: Service) -> &str {
        self.overrides
            .get(&service)
            .map(String::as_str)
            .unwrap_or(&self.default_base_url)
    }
}
