use std::env;

use crate::env::{list_or, split_list};

const DEFAULT_PUBLIC_PATHS: &str =
    "/login,/api/auth,/favicon.ico,/assets,/health,/metrics,/swagger-ui,/api-docs";

/// Edge gate configuration.
///
/// # Environment Variables
///
/// - `PUBLIC_PATHS`: comma-separated path prefixes reachable without a session
/// - `LOGIN_PATH` (default: `/login`)
/// - `PUBLIC_SCHEME`: scheme used to rebuild the original URL when no
///   `x-forwarded-proto` header is present (default: `http`)
/// - `PORTAL_ROLES`: roles allowed on this portal's protected handlers;
///   empty means any authenticated role
#[derive(Clone, Debug)]
pub struct EdgeConfig {
    pub public_paths: Vec<String>,
    pub login_path: String,
    pub public_scheme: String,
    pub portal_roles: Vec<String>,
}

impl EdgeConfig {
    pub fn from_env() -> Self {
        Self {
            public_paths: list_or("PUBLIC_PATHS", DEFAULT_PUBLIC_PATHS),
            login_path: env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".to_string()),
            public_scheme: env::var("PUBLIC_SCHEME").unwrap_or_else(|_| "http".to_string()),
            portal_roles: list_or("PORTAL_ROLES", ""),
        }
    }

    /// Prefix match against the configured public paths.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn allows_role(&self, role: &str) -> bool {
        self.portal_roles.is_empty() || self.portal_roles.iter().any(|r| r == role)
    }

    pub fn with_portal_roles(mut self, roles: &str) -> Self {
        self.portal_roles = split_list(roles);
        self
    }
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            public_paths: split_list(DEFAULT_PUBLIC_PATHS),
            login_path: "/login".to_string(),
            public_scheme: "http".to_string(),
            portal_roles: Vec::new(),
        }
    }
}
