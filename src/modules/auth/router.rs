use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    get_session, login, login_page, login_with_otp, logout, request_otp, request_password_reset,
    reset_password,
};
use crate::state::AppState;

/// Routes nested under `/api/auth`.
pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/session", get(get_session))
        .route("/logout", post(logout))
        .route("/otp/request", post(request_otp))
        .route("/otp/login", post(login_with_otp))
        .route("/password-reset/request", post(request_password_reset))
        .route("/password-reset", post(reset_password))
}

pub fn init_login_page_router() -> Router<AppState> {
    Router::new().route("/login", get(login_page))
}
