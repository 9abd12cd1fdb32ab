use std::sync::Arc;

use elymica_auth::{AuthClient, RefreshCoordinator, SessionStore};
use elymica_config::{AuthServiceConfig, EdgeConfig, ServerConfig, ServiceEndpoints, SessionConfig};
use elymica_gateway::GatewayFactory;
use elymica_observability::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub gateway: GatewayFactory,
    pub session_config: SessionConfig,
    pub edge_config: EdgeConfig,
    pub server_config: ServerConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wires the Auth client, the shared refresh coordinator, the session
    /// store and the gateway factory together.
    pub fn new(
        auth_config: &AuthServiceConfig,
        session_config: SessionConfig,
        edge_config: EdgeConfig,
        endpoints: ServiceEndpoints,
        server_config: ServerConfig,
    ) -> anyhow::Result<Self> {
        let auth = Arc::new(AuthClient::new(auth_config)?);
        let coordinator = Arc::new(RefreshCoordinator::new(
            auth.clone(),
            session_config.refresh_grace,
        ));
        let sessions = Arc::new(SessionStore::new(auth, coordinator.clone(), &session_config));
        let gateway = GatewayFactory::new(endpoints, coordinator)?;

        Ok(Self {
            sessions,
            gateway,
            session_config,
            edge_config,
            server_config,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

pub fn init_app_state() -> anyhow::Result<AppState> {
    AppState::new(
        &AuthServiceConfig::from_env(),
        SessionConfig::from_env(),
        EdgeConfig::from_env(),
        ServiceEndpoints::from_env(),
        ServerConfig::from_env(),
    )
}
