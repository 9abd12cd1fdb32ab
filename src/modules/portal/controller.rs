use axum::body::Body;
use axum::extract::{Path, RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::{Extension, Json};
use elymica_config::Service;
use elymica_core::AppError;
use elymica_gateway::{ApiRequest, ClientAuthConfig, GatewayError, SessionHandle};
use elymica_models::TenantContext;
use tracing::{instrument, warn};

use super::model::{DashboardResponse, HealthResponse};
use crate::middleware::session::AuthenticatedSession;
use crate::state::AppState;

/// Signed-in user and tenant
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Principal of the current session", body = DashboardResponse),
        (status = 401, description = "Session missing or expired"),
        (status = 403, description = "Role not allowed on this portal")
    ),
    tag = "Portal"
)]
pub async fn dashboard(
    auth: AuthenticatedSession,
    tenant: Option<Extension<TenantContext>>,
) -> Json<DashboardResponse> {
    let principal = auth.session.principal;
    Json(DashboardResponse {
        user_id: principal.user_id,
        name: principal.name,
        email: principal.email,
        role: principal.role,
        tenant_id: principal.tenant_id,
        tenant_subdomain: principal.tenant_subdomain,
        host_tenant: tenant.map(|Extension(t)| t.subdomain),
    })
}

/// Forward a read to a backend service with the session's credentials
#[utoipa::path(
    get,
    path = "/api/services/{service}/{path}",
    params(
        ("service" = String, Path, description = "auth, lms, notifications, assignments, grading, enrollment, analytics or content"),
        ("path" = String, Path, description = "Path on the service")
    ),
    responses(
        (status = 200, description = "Service response, passed through"),
        (status = 401, description = "Session could not be renewed"),
        (status = 502, description = "Service unreachable")
    ),
    tag = "Portal"
)]
#[instrument(skip(state, auth, query))]
pub async fn forward_to_service(
    State(state): State<AppState>,
    auth: AuthenticatedSession,
    Path((service, path)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let service: Service = service
        .parse()
        .map_err(|e: String| AppError::not_found(anyhow::anyhow!(e)))?;
    let client = state
        .gateway
        .client(service, ClientAuthConfig::from_session(&auth.handle));

    let mut target = service_path(&path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target = format!("{}?{}", target, query);
    }
    let request = ApiRequest::get(target);

    let response = client
        .send(&request)
        .await
        .map_err(|e| gateway_error(e, &auth.handle))?;

    let mut builder = Response::builder().status(response.status);
    if let Some(content_type) = &response.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(response.body)).map_err(AppError::internal)
}

/// Re-encodes the decoded wildcard segment by segment, so `%3F` and `%23`
/// stay part of the path on the way out.
fn service_path(path: &str) -> String {
    let segments: Vec<String> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/{}", segments.join("/"))
}

fn gateway_error(err: GatewayError, handle: &SessionHandle) -> AppError {
    if handle.auth_failed() {
        return AppError::unauthorized("Session expired, please sign in again");
    }

    match err {
        GatewayError::Status { status, body, .. } => {
            AppError::new(status, anyhow::anyhow!(passthrough_message(status, body)))
        }
        other => {
            warn!(error = %other, "Service call failed");
            AppError::bad_gateway(other)
        }
    }
}

fn passthrough_message(status: StatusCode, body: String) -> String {
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Service error")
            .to_string()
    } else {
        body
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Portal"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_path_keeps_plain_segments() {
        assert_eq!(service_path("api/lms/courses"), "/api/lms/courses");
        assert_eq!(service_path("/api/lms/courses"), "/api/lms/courses");
    }

    #[test]
    fn test_service_path_reencodes_reserved_characters() {
        assert_eq!(
            service_path("api/lms/courses?draft#top"),
            "/api/lms/courses%3Fdraft%23top"
        );
        assert_eq!(service_path("api/content/a b"), "/api/content/a%20b");
    }

    #[test]
    fn test_passthrough_message_falls_back_to_reason() {
        assert_eq!(
            passthrough_message(StatusCode::NOT_FOUND, "  ".to_string()),
            "Not Found"
        );
        assert_eq!(
            passthrough_message(StatusCode::CONFLICT, "taken".to_string()),
            "taken"
        );
    }
}
