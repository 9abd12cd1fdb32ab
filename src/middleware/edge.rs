use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use elymica_models::{TENANT_HEADER, TenantContext};
use elymica_observability::track_edge_redirect;
use tracing::debug;

use crate::state::AppState;

/// Runs once per request before any handler. Never mutates the session.
pub async fn edge_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    // Only the edge decides the tenant header.
    req.headers_mut().remove(TENANT_HEADER);

    let tenant = request_host(&req).and_then(|host| TenantContext::from_host(&host));
    if let Some(tenant) = tenant {
        if let Ok(value) = HeaderValue::from_str(&tenant.subdomain) {
            req.headers_mut().insert(TENANT_HEADER, value);
        }
        req.extensions_mut().insert(tenant);
    }

    let path = req.uri().path().to_string();
    if state.edge_config.is_public(&path) || has_session(&state, req.headers()) {
        return next.run(req).await;
    }

    let original = original_url(&req, &state.edge_config.public_scheme);
    debug!(path = %path, "No session on protected path, redirecting to login");
    track_edge_redirect();

    let location = format!(
        "{}?callbackUrl={}",
        state.edge_config.login_path,
        urlencoding::encode(&original)
    );
    Redirect::temporary(&location).into_response()
}

fn has_session(state: &AppState, headers: &HeaderMap) -> bool {
    CookieJar::from_headers(headers)
        .get(&state.session_config.cookie_name)
        .and_then(|cookie| state.sessions.codec().decode(cookie.value()))
        .is_some()
}

fn request_host(req: &Request) -> Option<String> {
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()))
}

/// Reconstructs the URL the client asked for.
fn original_url(req: &Request, default_scheme: &str) -> String {
    let scheme = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default_scheme);
    let host = request_host(req).unwrap_or_else(|| "localhost".to_string());
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    format!("{}://{}{}", scheme, host, path_and_query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, host: &str) -> Request {
        Request::builder()
            .uri(uri)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_original_url_uses_default_scheme() {
        let req = request("/dashboard?tab=grades", "sunrise.elymica.com");
        assert_eq!(
            original_url(&req, "http"),
            "http://sunrise.elymica.com/dashboard?tab=grades"
        );
    }

    #[test]
    fn test_original_url_prefers_forwarded_proto() {
        let mut req = request("/dashboard", "sunrise.elymica.com");
        req.headers_mut()
            .insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(
            original_url(&req, "http"),
            "https://sunrise.elymica.com/dashboard"
        );
    }

    #[test]
    fn test_request_host_keeps_port() {
        let req = request("/", "localhost:3000");
        assert_eq!(request_host(&req).as_deref(), Some("localhost:3000"));
    }
}
