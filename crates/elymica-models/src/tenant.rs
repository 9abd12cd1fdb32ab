use std::net::IpAddr;

use serde::Serialize;

/// Header the edge gate stamps with the host-derived tenant subdomain.
pub const TENANT_HEADER: &str = "x-elymica-tenant";

/// Tenant resolved from the request host. Lives for one request only and is
/// handed to downstream code explicitly (request extension), never through
/// global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    pub subdomain: String,
}

impl TenantContext {
    pub fn new(subdomain: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
        }
    }

    /// Derives the tenant from the first DNS label of `host`
    /// (`sunrise.elymica.com:443` → `sunrise`).
    ///
    /// IP literals carry no tenant.
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.trim();
        if host.starts_with('[') {
            return None;
        }

        let hostname = host.split(':').next().unwrap_or_default();
        if hostname.parse::<IpAddr>().is_ok() {
            return None;
        }

        let label = hostname.split('.').next().unwrap_or_default();
        if label.is_empty() {
            return None;
        }

        Some(Self::new(label.to_ascii_lowercase()))
    }
}
