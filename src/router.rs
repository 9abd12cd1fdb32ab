use crate::docs::ApiDoc;
use crate::middleware::edge::edge_middleware;
use crate::middleware::session::session_middleware;
use crate::modules::auth::router::{init_auth_router, init_login_page_router};
use crate::modules::portal::router::init_portal_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use elymica_observability::{
    is_observability_enabled, logging_middleware, metrics_app, metrics_middleware,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn init_router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(init_login_page_router())
        .merge(init_portal_router())
        .nest("/api/auth", init_auth_router());

    if let Some(handle) = state.metrics.clone() {
        router = router.merge(metrics_app(handle));
    }

    let mut router = router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), edge_middleware))
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .server_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware));

    if is_observability_enabled() {
        router = router.layer(middleware::from_fn(metrics_middleware));
    }

    router
}
