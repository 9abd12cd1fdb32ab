//! Session materialization.
//!
//! The signed cookie is the only state carried between requests. Each request
//! decodes its own working copy, advances it through the refresh state machine
//! and exposes it to handlers through a [`SessionHandle`] extension. Whatever
//! the handle holds once the handler returns is what gets written back.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use elymica_config::SessionConfig;
use elymica_core::{AppError, now_millis};
use elymica_gateway::SessionHandle;
use elymica_models::Session;
use tracing::error;

use crate::middleware::role::ensure_portal_role;
use crate::state::AppState;

pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let now = now_millis();
    let cookie_name = &state.session_config.cookie_name;
    let had_cookie = jar.get(cookie_name).is_some();

    let decoded = jar
        .get(cookie_name)
        .and_then(|cookie| state.sessions.codec().decode(cookie.value()));
    let working = match decoded.clone() {
        Some(session) => Some(state.sessions.materialize(session, now).await),
        None => None,
    };

    let handle = SessionHandle::new(working);
    req.extensions_mut().insert(handle.clone());

    let response = next.run(req).await;

    let current = handle.snapshot();
    if current == decoded && (current.is_some() || !had_cookie) {
        return response;
    }

    match persist(&state, jar, current.as_ref(), now) {
        Ok(jar) => (jar, response).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode session");
            response
        }
    }
}

fn persist(
    state: &AppState,
    jar: CookieJar,
    session: Option<&Session>,
    now_ms: i64,
) -> anyhow::Result<CookieJar> {
    let config = &state.session_config;
    let Some(session) = session else {
        return Ok(jar.remove(Cookie::build(config.cookie_name.clone()).path("/")));
    };

    let value = state.sessions.codec().encode(session, now_ms)?;
    Ok(jar.add(session_cookie(config, value)))
}

fn session_cookie(config: &SessionConfig, value: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build()
}

/// The request's session slot, whatever state it is in.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionHandle);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("Session layer is not installed")))
    }
}

/// A usable session: present, not in an error state, and allowed on this
/// portal.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub session: Session,
    pub handle: SessionHandle,
}

impl FromRequestParts<AppState> for AuthenticatedSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(handle) = CurrentSession::from_request_parts(parts, state).await?;

        let session = handle
            .snapshot()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        if let Some(error) = session.error {
            return Err(AppError::unauthorized(format!(
                "Session expired ({}), please sign in again",
                error
            )));
        }

        ensure_portal_role(&state.edge_config, session.principal.role)?;

        Ok(Self { session, handle })
    }
}
