use axum::{Router, routing::get};

use super::controller::{dashboard, forward_to_service, health};
use crate::state::AppState;

pub fn init_portal_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/health", get(health))
        .route("/api/services/{service}/{*path}", get(forward_to_service))
}
