use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub use metrics_exporter_prometheus::PrometheusHandle;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `None` when observability is disabled or a recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )
        .map_err(|e| tracing::warn!(error = %e, "Invalid metric buckets"))
        .ok()?;

    let handle = builder
        .install_recorder()
        .map_err(|e| tracing::warn!(error = %e, "Prometheus recorder not installed"))
        .ok()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

/// Records request counts and latency per matched route.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Router exposing `GET /metrics` for the given recorder.
pub fn metrics_app<S>(handle: PrometheusHandle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

/// What triggered a token refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Session materialization inside the expiry buffer.
    Proactive,
    /// A backend call answered `401`.
    Reactive,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshTrigger::Proactive => "proactive",
            RefreshTrigger::Reactive => "reactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Rotated,
    /// Served from a rotation already performed for the same refresh token.
    Shared,
    Failed,
    MissingToken,
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Rotated => "rotated",
            RefreshOutcome::Shared => "shared",
            RefreshOutcome::Failed => "failed",
            RefreshOutcome::MissingToken => "missing_token",
        }
    }
}

pub fn track_login_success(role: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("portal_logins_total", "role" => role.to_string(), "status" => "success").increment(1);
}

pub fn track_login_failure(reason: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("portal_logins_total", "role" => "unknown", "status" => "failure", "reason" => reason.to_string()).increment(1);
}

pub fn track_token_refresh(trigger: RefreshTrigger, outcome: RefreshOutcome) {
    if !is_observability_enabled() {
        return;
    }
    counter!(
        "token_refreshes_total",
        "trigger" => trigger.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn track_session_error(kind: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("session_errors_total", "kind" => kind.to_string()).increment(1);
}

pub fn track_edge_redirect() {
    if !is_observability_enabled() {
        return;
    }
    counter!("edge_login_redirects_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_values() {
        assert_eq!(RefreshTrigger::Proactive.as_str(), "proactive");
        assert_eq!(RefreshTrigger::Reactive.as_str(), "reactive");
        assert_eq!(RefreshOutcome::Shared.as_str(), "shared");
        assert_eq!(RefreshOutcome::MissingToken.as_str(), "missing_token");
    }

    #[test]
    fn test_tracking_without_recorder_is_noop() {
        track_login_success("teacher");
        track_login_failure("invalid_credentials");
        track_token_refresh(RefreshTrigger::Reactive, RefreshOutcome::Failed);
        track_session_error("RefreshTokenMissing");
        track_edge_redirect();
    }
}
