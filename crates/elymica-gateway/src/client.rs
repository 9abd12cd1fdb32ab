use std::sync::Arc;

use elymica_auth::TokenRefresher;
use elymica_config::Service;
use elymica_observability::{RefreshOutcome, RefreshTrigger, track_token_refresh};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::attempt::Attempt;
use crate::error::GatewayError;
use crate::provider::ClientAuthConfig;
use crate::request::ApiRequest;

pub const TENANT_ID_HEADER: &str = "X-Tenant-ID";

/// A buffered service response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self, service: Service) -> Result<T, GatewayError> {
        serde_json::from_slice(&self.body).map_err(|e| GatewayError::Decode {
            service,
            message: e.to_string(),
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone)]
pub struct ApiClient {
    service: Service,
    base_url: String,
    http: reqwest::Client,
    auth: ClientAuthConfig,
    refresher: Arc<dyn TokenRefresher>,
}

impl ApiClient {
    pub fn new(
        service: Service,
        base_url: impl Into<String>,
        http: reqwest::Client,
        auth: ClientAuthConfig,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        Self {
            service,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            auth,
            refresher,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `request`. A `401` is retried once with a rotated token; a
    /// second `401`, or a failed rotation, is returned as-is.
    ///
    /// Non-success statuses other than the handled `401` come back as
    /// [`GatewayError::Status`].
    #[instrument(skip_all, fields(service = %self.service, method = %request.method, path = %request.path))]
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, GatewayError> {
        let mut attempt = Attempt::first(request);

        loop {
            let response = self.dispatch(&attempt).await?;

            if response.status == StatusCode::UNAUTHORIZED && attempt.can_retry() {
                match self.recover().await {
                    Some(access_token) => {
                        debug!("Replaying request with rotated token");
                        attempt = attempt.retry_with(access_token);
                        continue;
                    }
                    None => return Err(self.status_error(response)),
                }
            }

            if !response.status.is_success() {
                return Err(self.status_error(response));
            }
            return Ok(response);
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.send(&ApiRequest::get(path)).await?.json(self.service)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let request = ApiRequest::post(path).with_json(body)?;
        self.send(&request).await?.json(self.service)
    }

    async fn dispatch(&self, attempt: &Attempt<'_>) -> Result<ApiResponse, GatewayError> {
        let request = attempt.request();
        let mut builder = self
            .http
            .request(request.method.clone(), format!("{}{}", self.base_url, request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let bearer = attempt
            .bearer()
            .map(str::to_string)
            .or_else(|| self.auth.tokens.access_token());
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        if let Some(tenant_id) = self.auth.tenant.tenant_id() {
            builder = builder.header(TENANT_ID_HEADER, tenant_id);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| GatewayError::Transport {
            service: self.service,
            source,
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|source| GatewayError::Transport {
                service: self.service,
                source,
            })?
            .to_vec();

        debug!(status = %status.as_u16(), retries = attempt.retries(), "Service responded");

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }

    /// Rotates tokens after a `401`. Returns the new access token, or `None`
    /// after notifying `on_auth_failed`.
    async fn recover(&self) -> Option<String> {
        let Some(refresh_token) = self.auth.tokens.refresh_token().filter(|t| !t.is_empty())
        else {
            warn!("Unauthorized and no refresh token available");
            track_token_refresh(RefreshTrigger::Reactive, RefreshOutcome::MissingToken);
            self.auth.events.on_auth_failed();
            return None;
        };

        match self.refresher.rotation(&refresh_token).await {
            Ok(rotation) => {
                let outcome = if rotation.shared {
                    RefreshOutcome::Shared
                } else {
                    RefreshOutcome::Rotated
                };
                track_token_refresh(RefreshTrigger::Reactive, outcome);
                self.auth.events.on_token_rotated(&rotation.tokens);
                Some(rotation.tokens.access_token)
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Reactive token refresh failed");
                track_token_refresh(RefreshTrigger::Reactive, RefreshOutcome::Failed);
                self.auth.events.on_auth_failed();
                None
            }
        }
    }

    fn status_error(&self, response: ApiResponse) -> GatewayError {
        GatewayError::Status {
            service: self.service,
            status: response.status,
            body: response.text(),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish()
    }
}
