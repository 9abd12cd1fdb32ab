//! Fake backends for integration tests.
//!
//! [`FakeAuth`] behaves like the external Auth service: refresh tokens rotate
//! on every use and the presented one is invalidated. [`FakeLms`] accepts only
//! access tokens the fake Auth service currently considers valid.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use elymica::state::AppState;
use elymica_config::{AuthServiceConfig, EdgeConfig, ServerConfig, ServiceEndpoints, SessionConfig};
use parking_lot::Mutex;
use serde_json::{Value, json};
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-session-secret-at-least-32-characters";
pub const PARENT_EMAIL: &str = "p@school.com";
pub const TEACHER_EMAIL: &str = "t@school.com";
pub const PASSWORD: &str = "validpass123";
pub const TENANT: &str = "sunrise";
pub const HOST: &str = "sunrise.elymica.com";
pub const PHONE: &str = "+2348000000001";
pub const OTP_CODE: &str = "482913";
pub const RESET_TOKEN: &str = "reset-token-1";

/// Binds `router` on an ephemeral port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", address)
}

pub struct FakeAuthState {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub expires_in: Mutex<String>,
    pub token_type: Mutex<String>,
    pub refresh_delay: Mutex<Duration>,
    pub refresh_unavailable: AtomicBool,
    pub otp_requests: AtomicUsize,
    pub reset_requests: AtomicUsize,
    pub account_service_unavailable: AtomicBool,
    pub new_password: Mutex<Option<String>>,
    reset_token_used: AtomicBool,
    issued: AtomicUsize,
    valid_access: Mutex<HashSet<String>>,
    valid_refresh: Mutex<HashSet<String>>,
}

impl FakeAuthState {
    fn new() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            expires_in: Mutex::new("3600".to_string()),
            token_type: Mutex::new("Bearer".to_string()),
            refresh_delay: Mutex::new(Duration::ZERO),
            refresh_unavailable: AtomicBool::new(false),
            otp_requests: AtomicUsize::new(0),
            reset_requests: AtomicUsize::new(0),
            account_service_unavailable: AtomicBool::new(false),
            new_password: Mutex::new(None),
            reset_token_used: AtomicBool::new(false),
            issued: AtomicUsize::new(0),
            valid_access: Mutex::new(HashSet::new()),
            valid_refresh: Mutex::new(HashSet::new()),
        }
    }

    fn issue(&self) -> (String, String) {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{}", n);
        let refresh = format!("refresh-{}", n);
        self.valid_access.lock().insert(access.clone());
        self.valid_refresh.lock().insert(refresh.clone());
        (access, refresh)
    }

    pub fn is_valid_access(&self, token: &str) -> bool {
        self.valid_access.lock().contains(token)
    }

    pub fn is_valid_refresh(&self, token: &str) -> bool {
        self.valid_refresh.lock().contains(token)
    }

    /// Simulates every issued access token expiring server-side.
    pub fn expire_access_tokens(&self) {
        self.valid_access.lock().clear();
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct FakeAuth {
    pub base_url: String,
    pub state: Arc<FakeAuthState>,
}

impl FakeAuth {
    pub async fn start() -> Self {
        let state = Arc::new(FakeAuthState::new());
        let router = Router::new()
            .route("/api/auth/login", post(fake_login))
            .route("/api/auth/refresh", post(fake_refresh))
            .route("/api/auth/me", get(fake_me))
            .route("/api/auth/logout", post(fake_logout))
            .route("/api/auth/request-otp", post(fake_request_otp))
            .route("/api/auth/login-with-otp", post(fake_login_with_otp))
            .route("/api/auth/request-password-reset", post(fake_request_password_reset))
            .route("/api/auth/reset-password", post(fake_reset_password))
            .with_state(state.clone());

        Self {
            base_url: spawn(router).await,
            state,
        }
    }
}

fn role_for(email: &str) -> Option<&'static str> {
    match email {
        PARENT_EMAIL => Some("parent"),
        TEACHER_EMAIL => Some("teacher"),
        _ => None,
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn fake_login(State(state): State<Arc<FakeAuthState>>, Json(body): Json<Value>) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);

    let email = body["email"].as_str().unwrap_or_default();
    let role = match role_for(email) {
        Some(role) if body["password"] == PASSWORD && body["tenant_subdomain"] == TENANT => role,
        _ => return unauthorized("Invalid credentials"),
    };

    login_payload(&state, email, role)
}

fn login_payload(state: &FakeAuthState, email: &str, role: &str) -> Response {
    let (access, refresh) = state.issue();
    Json(json!({
        "success": true,
        "access_token": access,
        "refresh_token": refresh,
        "token_type": state.token_type.lock().clone(),
        "expires_in": state.expires_in.lock().clone(),
        "user": {
            "id": state.user_id,
            "email": email,
            "name": "Pat Example",
            "role": role,
        },
        "tenant": {
            "id": state.tenant_id,
            "subdomain": TENANT,
            "name": "Sunrise Academy",
        }
    }))
    .into_response()
}

async fn fake_refresh(
    State(state): State<Arc<FakeAuthState>>,
    Json(body): Json<Value>,
) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *state.refresh_delay.lock();
    tokio::time::sleep(delay).await;

    if state.refresh_unavailable.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let presented = body["refresh_token"].as_str().unwrap_or_default();
    if !state.valid_refresh.lock().remove(presented) {
        return unauthorized("Invalid refresh token");
    }

    let (access, refresh) = state.issue();
    Json(json!({
        "success": true,
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "Bearer",
        "expires_in": state.expires_in.lock().clone(),
    }))
    .into_response()
}

async fn fake_me(State(state): State<Arc<FakeAuthState>>, headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(token) if state.is_valid_access(&token) => Json(json!({
            "success": true,
            "user": {
                "id": state.user_id,
                "email": PARENT_EMAIL,
                "name": "Pat Example",
                "role": "parent",
                "tenant_id": state.tenant_id,
                "tenant_subdomain": TENANT,
                "status": "active",
            }
        }))
        .into_response(),
        _ => unauthorized("Invalid access token"),
    }
}

async fn fake_logout(State(state): State<Arc<FakeAuthState>>, Json(body): Json<Value>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(token) = body["refresh_token"].as_str() {
        state.valid_refresh.lock().remove(token);
    }
    Json(json!({ "success": true })).into_response()
}

fn account_service_down(state: &FakeAuthState) -> bool {
    state.account_service_unavailable.load(Ordering::SeqCst)
}

async fn fake_request_otp(
    State(state): State<Arc<FakeAuthState>>,
    Json(body): Json<Value>,
) -> Response {
    state.otp_requests.fetch_add(1, Ordering::SeqCst);
    if account_service_down(&state) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if body["phone_number"] == PHONE && body["tenant_subdomain"] == TENANT {
        Json(json!({ "success": true, "message": "OTP sent" })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "User not found" })),
        )
            .into_response()
    }
}

async fn fake_login_with_otp(
    State(state): State<Arc<FakeAuthState>>,
    Json(body): Json<Value>,
) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    if body["phone_number"] == PHONE && body["otp"] == OTP_CODE && body["tenant_subdomain"] == TENANT
    {
        login_payload(&state, PARENT_EMAIL, "parent")
    } else {
        unauthorized("Invalid or expired OTP")
    }
}

/// Answers with an empty body, as the real service does.
async fn fake_request_password_reset(
    State(state): State<Arc<FakeAuthState>>,
    Json(body): Json<Value>,
) -> Response {
    state.reset_requests.fetch_add(1, Ordering::SeqCst);
    if account_service_down(&state) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    match body["email"].as_str().and_then(role_for) {
        Some(_) if body["tenant_subdomain"] == TENANT => StatusCode::OK.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn fake_reset_password(
    State(state): State<Arc<FakeAuthState>>,
    Json(body): Json<Value>,
) -> Response {
    if account_service_down(&state) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if body["token"] != RESET_TOKEN || state.reset_token_used.swap(true, Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Invalid or expired token" })),
        )
            .into_response();
    }
    *state.new_password.lock() = body["new_password"].as_str().map(str::to_string);
    Json(json!({ "success": true, "message": "Password updated" })).into_response()
}

pub struct FakeLmsState {
    pub auth: Arc<FakeAuthState>,
    pub calls: AtomicUsize,
    pub always_unauthorized: AtomicBool,
    pub tenant_headers: Mutex<Vec<Option<String>>>,
    pub unmatched_paths: Mutex<Vec<String>>,
}

impl FakeLmsState {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct FakeLms {
    pub base_url: String,
    pub state: Arc<FakeLmsState>,
}

impl FakeLms {
    pub async fn start(auth: &FakeAuth) -> Self {
        let state = Arc::new(FakeLmsState {
            auth: auth.state.clone(),
            calls: AtomicUsize::new(0),
            always_unauthorized: AtomicBool::new(false),
            tenant_headers: Mutex::new(Vec::new()),
            unmatched_paths: Mutex::new(Vec::new()),
        });
        let router = Router::new()
            .route("/api/lms/courses", get(fake_courses).post(fake_create_course))
            .fallback(fake_unmatched)
            .with_state(state.clone());

        Self {
            base_url: spawn(router).await,
            state,
        }
    }
}

async fn fake_courses(State(state): State<Arc<FakeLmsState>>, headers: HeaderMap) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.tenant_headers.lock().push(
        headers
            .get("x-tenant-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    if state.always_unauthorized.load(Ordering::SeqCst) {
        return unauthorized("Token expired");
    }

    match bearer(&headers) {
        Some(token) if state.auth.is_valid_access(&token) => {
            Json(json!([{ "id": "c-1", "title": "Algebra I" }])).into_response()
        }
        _ => unauthorized("Token expired"),
    }
}

/// Echoes the submitted course under the same auth rules as the listing.
async fn fake_create_course(
    State(state): State<Arc<FakeLmsState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers) {
        Some(token) if state.auth.is_valid_access(&token) => (
            StatusCode::CREATED,
            Json(json!({ "id": "c-2", "title": body["title"] })),
        )
            .into_response(),
        _ => unauthorized("Token expired"),
    }
}

async fn fake_unmatched(State(state): State<Arc<FakeLmsState>>, uri: Uri) -> Response {
    state.unmatched_paths.lock().push(uri.to_string());
    StatusCode::NOT_FOUND.into_response()
}

pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        secret: TEST_SECRET.to_string(),
        ..SessionConfig::default()
    }
}

pub fn test_state(auth: &FakeAuth, lms: &FakeLms, edge: EdgeConfig) -> AppState {
    AppState::new(
        &AuthServiceConfig::new(auth.base_url.clone()),
        test_session_config(),
        edge,
        ServiceEndpoints::new(lms.base_url.clone()),
        ServerConfig::from_env(),
    )
    .unwrap()
}
