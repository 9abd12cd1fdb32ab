//! Portal role restrictions.
//!
//! Each portal deployment serves one audience (`PORTAL_ROLES=teacher`,
//! `PORTAL_ROLES=parent,student`, ...). An authenticated principal whose role
//! is not listed is refused with `403`.

use elymica_config::EdgeConfig;
use elymica_core::AppError;
use elymica_models::Role;

pub fn ensure_portal_role(config: &EdgeConfig, role: Role) -> Result<(), AppError> {
    if config.allows_role(role.as_str()) {
        return Ok(());
    }

    Err(AppError::forbidden(format!(
        "Access denied. This portal is not available for role: {}",
        role
    )))
}
