use std::sync::Arc;

use elymica_auth::TokenRefresher;
use elymica_config::{Service, ServiceEndpoints};

use crate::client::ApiClient;
use crate::error::GatewayError;
use crate::provider::ClientAuthConfig;

/// Builds [`ApiClient`]s that share one connection pool and one refresher.
#[derive(Clone)]
pub struct GatewayFactory {
    http: reqwest::Client,
    endpoints: ServiceEndpoints,
    refresher: Arc<dyn TokenRefresher>,
}

impl GatewayFactory {
    pub fn new(
        endpoints: ServiceEndpoints,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(endpoints.timeout)
            .build()
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            http,
            endpoints,
            refresher,
        })
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    pub fn client(&self, service: Service, auth: ClientAuthConfig) -> ApiClient {
        ApiClient::new(
            service,
            self.endpoints.base_url(service),
            self.http.clone(),
            auth,
            self.refresher.clone(),
        )
    }
}

impl std::fmt::Debug for GatewayFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayFactory")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}
